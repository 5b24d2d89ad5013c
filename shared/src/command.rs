use serde::Serialize;

/// Instruction for the backend's simulation executor. Fire-and-forget: the
/// front end never mirrors pause state locally, it only issues commands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Pause,
    Resume,
    Speed(f64),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Pause => "pause",
            Command::Resume => "resume",
            Command::Speed(_) => "speed",
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Command::Speed(value) => Some(*value),
            _ => None,
        }
    }

    pub fn payload(&self) -> ControlPayload {
        ControlPayload {
            cmd: self.name(),
            value: self.value(),
        }
    }
}

/// Wire body for `POST /api/control`. `value` is omitted entirely for
/// commands that carry none.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlPayload {
    pub cmd: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::Command;
    use serde_json::json;

    #[test]
    fn pause_payload_has_no_value() {
        let payload = serde_json::to_value(Command::Pause.payload()).unwrap();
        assert_eq!(payload, json!({"cmd": "pause"}));
    }

    #[test]
    fn resume_payload_has_no_value() {
        let payload = serde_json::to_value(Command::Resume.payload()).unwrap();
        assert_eq!(payload, json!({"cmd": "resume"}));
    }

    #[test]
    fn speed_payload_carries_value() {
        let payload = serde_json::to_value(Command::Speed(1.5).payload()).unwrap();
        assert_eq!(payload, json!({"cmd": "speed", "value": 1.5}));
    }
}
