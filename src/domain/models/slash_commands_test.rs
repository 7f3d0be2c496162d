use super::SlashCommand;

#[test]
fn it_parse_empty_string() {
    assert!(SlashCommand::parse("").is_none());
}
#[test]
fn it_parse_space_only() {
    assert!(SlashCommand::parse(" ").is_none());
}
#[test]
fn it_parse_single_slash() {
    assert!(SlashCommand::parse("/").is_none());
}
#[test]
fn it_parse_invalid_prefix() {
    assert!(SlashCommand::parse("!q").is_none());
}
#[test]
fn it_parse_valid_prefix() {
    let cmd = SlashCommand::parse("/q");
    assert!(cmd.is_some());
    assert_eq!(cmd.unwrap().command, "/q");
}

#[test]
fn it_is_short_quit() {
    assert!(SlashCommand::parse("/q").unwrap().is_quit());
}
#[test]
fn it_is_quit() {
    assert!(SlashCommand::parse("/quit").unwrap().is_quit());
}
#[test]
fn it_is_exit() {
    assert!(SlashCommand::parse("/exit").unwrap().is_quit());
}
#[test]
fn it_is_not_quit() {
    assert!(!SlashCommand::parse("/new").unwrap().is_quit());
}

#[test]
fn it_is_short_new_chat() {
    assert!(SlashCommand::parse("/n").unwrap().is_new_chat());
}
#[test]
fn it_is_new_chat() {
    assert!(SlashCommand::parse("/new").unwrap().is_new_chat());
}

#[test]
fn it_is_short_open_conversation() {
    assert!(SlashCommand::parse("/o 1").unwrap().is_open_conversation());
}
#[test]
fn it_is_open_conversation() {
    let cmd = SlashCommand::parse("/open 1").unwrap();
    assert!(cmd.is_open_conversation());
    assert_eq!(cmd.args, vec!["1".to_string()]);
}

#[test]
fn it_is_short_delete_conversation() {
    assert!(SlashCommand::parse("/d 2").unwrap().is_delete_conversation());
}
#[test]
fn it_is_delete_conversation() {
    assert!(SlashCommand::parse("/delete")
        .unwrap()
        .is_delete_conversation());
}

#[test]
fn it_is_short_list_conversations() {
    assert!(SlashCommand::parse("/ls").unwrap().is_list_conversations());
}
#[test]
fn it_is_list_conversations() {
    assert!(SlashCommand::parse("/conversations")
        .unwrap()
        .is_list_conversations());
}

#[test]
fn it_is_short_copy_chat() {
    assert!(SlashCommand::parse("/c").unwrap().is_copy_chat());
}
#[test]
fn it_is_copy_chat() {
    assert!(SlashCommand::parse("/copy").unwrap().is_copy_chat());
}
#[test]
fn it_is_not_copy_chat() {
    assert!(!SlashCommand::parse("/copy 1").unwrap().is_copy_chat());
}

#[test]
fn it_is_short_copy_code() {
    assert!(SlashCommand::parse("/c 1").unwrap().is_copy_code_block());
}
#[test]
fn it_is_copy_code() {
    assert!(SlashCommand::parse("/copy 1").unwrap().is_copy_code_block());
}
#[test]
fn it_is_not_copy_code() {
    assert!(!SlashCommand::parse("/copy").unwrap().is_copy_code_block());
}

#[test]
fn it_is_stats() {
    assert!(SlashCommand::parse("/stats").unwrap().is_stats());
}

#[test]
fn it_is_short_help() {
    assert!(SlashCommand::parse("/h").unwrap().is_help());
}
#[test]
fn it_is_help() {
    assert!(SlashCommand::parse("/help").unwrap().is_help());
}
