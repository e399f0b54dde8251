use super::*;

#[test]
fn turn_errors_convert_and_carry_their_code() {
    let err = CliError::from(TransportError::Incomplete { commands: 2 });
    assert!(matches!(err, CliError::Turn(TurnError::Transport(_))));
    assert_eq!(
        err.to_string(),
        "turn failed [E_TRANSPORT_INCOMPLETE]: stream ended before completion (2 commands received)"
    );
}

#[test]
fn schema_errors_convert_through_turn_error() {
    let schema = wire::SchemaError::MissingCommands { raw: "{}".into() };
    let err = CliError::from(TurnError::from(schema));
    assert_eq!(err.to_string(), "turn failed [E_SCHEMA_MISSING_COMMANDS]: document has no `commands` key");
}

#[test]
fn engine_and_config_errors_convert() {
    let busy = CliError::from(EngineError::StrokeInProgress(canvas::StrokeSource::Ai));
    assert!(matches!(busy, CliError::Engine(_)));
    let missing = CliError::from(ConfigError::MissingApiKey { var: "SKETCH_API_KEY_ENV".into() });
    assert!(missing.to_string().contains("SKETCH_API_KEY_ENV"));
}

#[test]
fn fallback_body_switches_streaming_off() {
    let body = non_streaming(serde_json::json!({"model": "m", "stream": true}));
    assert_eq!(body["stream"], false);
    assert_eq!(body["model"], "m");
}
