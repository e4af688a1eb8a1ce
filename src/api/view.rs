//! HTML rendering for browser form submissions

use std::fmt::Write;

use crate::error::WeatherError;
use crate::models::WeatherDisplay;

fn escape(text: &str) -> String {
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

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n    <meta charset=\"utf-8\">\n    \
         <title>{title}</title>\n</head>\n<body>\n{body}    <p><a href=\"/\">Search again</a></p>\n\
         </body>\n</html>\n"
    )
}

/// Forecast table for one city
pub fn render_weather(forecast: &WeatherDisplay) -> String {
    let city = escape(&forecast.city);
    let mut body = format!("    <h1>Weather for {city}</h1>\n");

    if forecast.is_empty() {
        body.push_str("    <p>No forecast data available.</p>\n");
    } else {
        body.push_str("    <table>\n        <tr><th>Time</th><th>Temperature</th></tr>\n");
        for entry in &forecast.forecasts {
            // Writing to a String cannot fail
            let _ = writeln!(
                body,
                "        <tr><td>{}</td><td>{}</td></tr>",
                escape(&entry.label),
                escape(&entry.temperature_label)
            );
        }
        body.push_str("    </table>\n");
    }

    page(&format!("Citycast - {city}"), &body)
}

pub fn render_error(err: &WeatherError) -> String {
    let body = format!(
        "    <h1>Something went wrong</h1>\n    <p>{}</p>\n",
        escape(&err.user_message())
    );
    page("Citycast - error", &body)
}
