mod readings_test;
