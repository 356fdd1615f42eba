use super::*;

#[test]
fn test_command_deserialize() {
    let json = r#"{"type": "highlight", "target_id": "btn-1", "text": "Pay here"}"#;
    let cmd: Command = serde_json::from_str(json).unwrap();
    assert_eq!(cmd.kind, CommandKind::Highlight);
    assert_eq!(cmd.target_id, "btn-1");
    assert_eq!(cmd.text.as_deref(), Some("Pay here"));
}

#[test]
fn test_command_accepts_legacy_id_key() {
    let json = r#"{"type": "click", "id": "submit"}"#;
    let cmd: Command = serde_json::from_str(json).unwrap();
    assert_eq!(cmd.kind, CommandKind::Click);
    assert_eq!(cmd.target_id, "submit");
}

#[test]
fn test_clear_without_target() {
    let cmd: Command = serde_json::from_str(r#"{"type": "clear"}"#).unwrap();
    assert_eq!(cmd, Command::clear());
    assert!(!cmd.kind.needs_target());
}

#[test]
fn test_scroll_to_kind_name() {
    let cmd: Command = serde_json::from_str(r#"{"type": "scroll_to", "target_id": "x"}"#).unwrap();
    assert_eq!(cmd.kind, CommandKind::ScrollTo);
    assert_eq!(cmd.kind.to_string(), "scroll_to");
}

#[test]
fn test_extended_kinds() {
    let cmd: Command =
        serde_json::from_str(r#"{"type": "type_text", "target_id": "search", "text": "acme"}"#)
            .unwrap();
    assert_eq!(cmd.kind, CommandKind::TypeText);
    assert!(cmd.kind.needs_target());

    let cmd: Command = serde_json::from_str(r#"{"type": "scroll", "text": "up"}"#).unwrap();
    assert_eq!(cmd.kind, CommandKind::Scroll);
    assert!(!cmd.kind.needs_target());

    let cmd: Command = serde_json::from_str(r#"{"type": "wait"}"#).unwrap();
    assert_eq!(cmd.kind, CommandKind::Wait);
    assert!(!cmd.kind.needs_target());
}

#[test]
fn test_unknown_kind_decodes_as_unsupported() {
    let cmd: Command = serde_json::from_str(r#"{"type": "drag", "target_id": "x"}"#).unwrap();
    assert_eq!(cmd.kind, CommandKind::Unsupported);
    assert_eq!(cmd.target_id, "x");
    assert!(!cmd.kind.needs_target());
}

#[test]
fn test_command_serialize_skips_missing_text() {
    let json = serde_json::to_value(Command::new(CommandKind::Spotlight, "hero")).unwrap();
    assert_eq!(json["type"], "spotlight");
    assert!(json.get("text").is_none());
}

#[test]
fn test_execution_result() {
    assert!(ExecutionResult::success().is_success());
    let err = ExecutionResult::error("Target not found: ghost-42");
    assert!(!err.is_success());
    assert_eq!(err.status, ExecutionStatus::Error);
    assert!(err.reason.unwrap().contains("ghost-42"));
}
