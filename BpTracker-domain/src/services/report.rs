//! Printable HTML report.
//!
//! The renderer is a pure function of its inputs. All user-entered text
//! passes through [`escape_html`].

use std::fmt::Write;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};

use crate::entities::reading::Reading;
use crate::entities::settings::{Capabilities, Settings};
use crate::services::classifier::Classify;
use crate::services::statistics::rolling_average;

/// Generation time format on the report header
pub const GENERATED_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// Print delay used when none is configured
pub const DEFAULT_PRINT_DELAY: Duration = Duration::from_millis(250);

const STYLE: &str = "\
    body { font-family: Arial, sans-serif; max-width: 800px; margin: 40px auto; padding: 20px; }\n\
    .header { text-align: center; margin-bottom: 30px; border-bottom: 3px solid #2563eb; padding-bottom: 20px; }\n\
    h1 { color: #1e40af; }\n\
    .summary { background: #eff6ff; padding: 20px; border-radius: 10px; margin-bottom: 30px; }\n\
    .reading { border: 1px solid #e5e7eb; padding: 15px; margin-bottom: 15px; border-radius: 8px; }\n\
    .bp-value { font-size: 24px; font-weight: bold; }\n\
    .badge { display: inline-block; padding: 2px 10px; border-radius: 12px; font-size: 12px; color: #fff; }\n\
    .badge.normal { background: #16a34a; }\n\
    .badge.elevated { background: #ca8a04; }\n\
    .badge.stage1 { background: #ea580c; }\n\
    .badge.stage2 { background: #dc2626; }\n\
    .badge.crisis { background: #7f1d1d; }\n\
    .advice { color: #4b5563; font-size: 14px; }\n";

/// Rendering switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    pub capabilities: Capabilities,
    /// Embed a script that opens the print dialog after this delay
    pub print_delay: Option<Duration>,
}

/// Escape text for use in HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render the full report. Readings are given newest first and listed oldest first.
pub fn render_report(
    readings: &[Reading],
    settings: &Settings,
    classifier: &dyn Classify,
    generated_at: DateTime<FixedOffset>,
    options: &ReportOptions,
) -> String {
    let title_name = escape_html(settings.patient_name().unwrap_or("Patient"));
    let header_name = escape_html(settings.patient_name().unwrap_or("Not Specified"));

    let mut html = String::new();
    // Writing into a String cannot fail
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"utf-8\">\n  <title>BP Report - {}</title>\n  <style>\n{}  </style>\n</head>\n<body>\n",
        title_name, STYLE
    );

    let _ = write!(
        html,
        "  <div class=\"header\">\n    <h1>Blood Pressure Report</h1>\n    <p><strong>Patient:</strong> {}</p>\n    <p><strong>Generated:</strong> {}</p>\n    <p><strong>Readings:</strong> {}</p>\n  </div>\n",
        header_name,
        generated_at.format(GENERATED_FORMAT),
        readings.len()
    );

    if let Some(average) = rolling_average(readings) {
        let _ = write!(
            html,
            "  <div class=\"summary\">\n    <h2>7-Day Summary</h2>\n    <p>Average BP: {}/{} mmHg</p>\n    <p>Average Pulse: {} bpm</p>\n    <p>Total Readings: {}</p>\n  </div>\n",
            average.systolic,
            average.diastolic,
            average.pulse,
            readings.len()
        );
    }

    html.push_str("  <h2>Reading History</h2>\n");
    for reading in readings.iter().rev() {
        render_entry(&mut html, reading, classifier, &options.capabilities);
    }

    if let Some(delay) = options.print_delay {
        let _ = write!(
            html,
            "  <script>window.addEventListener('load', function () {{ setTimeout(function () {{ window.print(); }}, {}); }});</script>\n",
            delay.as_millis()
        );
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_entry(html: &mut String, reading: &Reading, classifier: &dyn Classify, capabilities: &Capabilities) {
    let classification =
        classifier.classify(i32::from(reading.systolic), i32::from(reading.diastolic));
    let level = classification.level;

    let _ = write!(
        html,
        "    <div class=\"reading\">\n      <div class=\"bp-value\">{}/{}</div>\n      <span class=\"badge {}\">{}</span>\n      <p>Pulse: {} bpm | {} at {}</p>\n",
        reading.systolic,
        reading.diastolic,
        level.css_class(),
        level.label(),
        reading.pulse,
        escape_html(&reading.date),
        escape_html(&reading.time)
    );

    if capabilities.show_medication_flag && reading.medication {
        html.push_str("      <p>Medication taken</p>\n");
    }

    if let Some(notes) = &reading.notes {
        let _ = writeln!(html, "      <p><em>{}</em></p>", escape_html(notes));
    }

    let _ = write!(
        html,
        "      <p class=\"advice\">{}</p>\n    </div>\n",
        escape_html(classification.advice)
    );
}
