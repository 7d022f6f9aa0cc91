use serde::Serialize;
use utoipa::ToSchema;

use super::error::{EngineError, EngineResult};
use super::scoring::round1;
use crate::model::checkin::{ReadinessInputs, ReadinessStatus};

const SCALE_MIN: u8 = 1;
const SCALE_MAX: u8 = 10;
const GREEN_AT: f64 = 70.0;
const YELLOW_AT: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Readiness {
    #[schema(example = 75.0)]
    pub score: f64,
    pub status: ReadinessStatus,
}

/// Maps the four 1..=10 answers onto a 0..=100 score. Stress is inverted.
pub fn evaluate(inputs: &ReadinessInputs) -> EngineResult<Readiness> {
    for (name, value) in [
        ("mood", inputs.mood),
        ("stress", inputs.stress),
        ("sleep", inputs.sleep),
        ("physical", inputs.physical),
    ] {
        if !(SCALE_MIN..=SCALE_MAX).contains(&value) {
            return Err(EngineError::InvalidInput(format!(
                "{name} must be between {SCALE_MIN} and {SCALE_MAX}, got {value}"
            )));
        }
    }

    let stress = SCALE_MAX + SCALE_MIN - inputs.stress;
    let total = [inputs.mood, stress, inputs.sleep, inputs.physical]
        .iter()
        .map(|v| f64::from(v - SCALE_MIN))
        .sum::<f64>();
    let span = f64::from(SCALE_MAX - SCALE_MIN) * 4.0;
    let score = round1(total / span * 100.0);

    Ok(Readiness {
        score,
        status: status_for(score),
    })
}

pub fn status_for(score: f64) -> ReadinessStatus {
    if score >= GREEN_AT {
        ReadinessStatus::Green
    } else if score >= YELLOW_AT {
        ReadinessStatus::Yellow
    } else {
        ReadinessStatus::Red
    }
}
