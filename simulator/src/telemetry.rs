use rand::Rng;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorPayload {
    pub temperature: f64,
    pub humidity: f64,
    pub air_quality: f64,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn generate_reading(rng: &mut impl Rng) -> SensorPayload {
    SensorPayload {
        temperature: round_to(rng.gen_range(24.0..30.0), 1),
        humidity: round_to(rng.gen_range(40.0..70.0), 1),
        air_quality: round_to(rng.gen_range(80.0..150.0), 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_readings_within_ranges() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let reading = generate_reading(&mut rng);
            assert!((24.0..=30.0).contains(&reading.temperature));
            assert!((40.0..=70.0).contains(&reading.humidity));
            assert!((80.0..=150.0).contains(&reading.air_quality));
            assert_eq!(reading.air_quality.fract(), 0.0);
            assert_eq!(round_to(reading.temperature, 1), reading.temperature);
        }
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(25.46, 1), 25.5);
        assert_eq!(round_to(94.5, 0), 95.0);
    }

    #[test]
    fn test_payload_field_names() {
        let payload = SensorPayload {
            temperature: 25.5,
            humidity: 60.2,
            air_quality: 95.0,
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"temperature": 25.5, "humidity": 60.2, "air_quality": 95.0})
        );
    }
}
