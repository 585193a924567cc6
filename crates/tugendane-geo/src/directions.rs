//! Rendering a route into SMS-sized walking instructions.

use tugendane_core::Language;

use crate::locator::DirectionStep;

/// Minimum leg length worth mentioning, in meters. Shorter middle legs are
/// folded away; the first and last steps always survive.
const MIN_STEP_METERS: f64 = 10.0;

/// Walking pace used for the journey estimate, minutes per kilometer.
const MINUTES_PER_KM: f64 = 12.0;

/// Format route steps into a numbered, localized message.
pub fn format_directions_text(steps: &[DirectionStep], language: Language) -> String {
    if steps.is_empty() {
        return match language {
            Language::En => "Directions are not available at the moment.".to_string(),
            Language::Rw => "Amabwiriza ntabwo abonetse kuri iyi saha.".to_string(),
        };
    }

    let total_km: f64 = steps.iter().map(|s| s.distance_meters).sum::<f64>() / 1000.0;
    let minutes = (total_km * MINUTES_PER_KM).round().max(1.0) as u64;

    let mut lines = Vec::new();
    lines.push(match language {
        Language::En => format!(
            "Total journey: {:.1} kilometers, approximately {} minutes walking.",
            total_km, minutes
        ),
        Language::Rw => format!(
            "Urugendo rwose: kilometero {:.1}, hafi iminota {} n'amaguru.",
            total_km, minutes
        ),
    });

    let last = steps.len() - 1;
    let mut number = 1;
    for (idx, step) in steps.iter().enumerate() {
        let keep = idx == 0 || idx == last || step.distance_meters >= MIN_STEP_METERS;
        if !keep {
            continue;
        }
        lines.push(format!(
            "{}. {} ({})",
            number,
            step.text,
            distance_text(step.distance_meters, language)
        ));
        number += 1;
    }

    lines.join("\n")
}

/// Human distance: meters below one kilometer, otherwise kilometers with one
/// decimal place.
pub fn distance_text(meters: f64, language: Language) -> String {
    if meters < 1000.0 {
        let m = meters.round() as u64;
        match language {
            Language::En => format!("{} m", m),
            Language::Rw => format!("metero {}", m),
        }
    } else {
        let km = meters / 1000.0;
        match language {
            Language::En => format!("{:.1} km", km),
            Language::Rw => format!("kilometero {:.1}", km),
        }
    }
}
