#[cfg(test)]
mod tests {
    use chrono::Utc;
    use parley::chat::history::{build_outbound, IdGenerator, Message, Sender, DEFAULT_SYSTEM_PROMPT};
    use parley::llm::models::{ChatMessage, Role};

    fn msg(sender: Sender, content: &str) -> Message {
        Message {
            id: content.to_string(),
            content: content.to_string(),
            sender,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_empty_history_yields_system_and_user() {
        let out = build_outbound(&[], "hello", DEFAULT_SYSTEM_PROMPT, 10);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0], ChatMessage::system(DEFAULT_SYSTEM_PROMPT));
        assert_eq!(out[1], ChatMessage::user("hello"));
    }

    #[test]
    fn test_ai_greeting_maps_to_assistant() {
        let history = vec![msg(Sender::Ai, "hi")];
        let out = build_outbound(&history, "2+2?", "sys", 10);

        assert_eq!(
            out,
            vec![
                ChatMessage::system("sys"),
                ChatMessage::assistant("hi"),
                ChatMessage::user("2+2?"),
            ]
        );
    }

    #[test]
    fn test_long_history_keeps_last_ten_oldest_first() {
        let history: Vec<Message> = (0..25)
            .map(|i| {
                let sender = if i % 2 == 0 { Sender::User } else { Sender::Ai };
                msg(sender, &format!("m{}", i))
            })
            .collect();

        let out = build_outbound(&history, "next", "sys", 10);

        // 1. System preamble + 10 prior turns + new user message
        assert_eq!(out.len(), 12);
        assert_eq!(out[0].role, Role::System);
        assert_eq!(out.iter().filter(|m| m.role == Role::System).count(), 1);

        // 2. Prior turns are the most recent ten, in order
        let prior: Vec<&str> = out[1..11].iter().map(|m| m.content.as_str()).collect();
        let expected: Vec<String> = (15..25).map(|i| format!("m{}", i)).collect();
        assert_eq!(prior, expected.iter().map(String::as_str).collect::<Vec<_>>());

        // 3. The new message always comes last
        assert_eq!(out[11], ChatMessage::user("next"));
    }

    #[test]
    fn test_sender_role_mapping_is_total() {
        assert_eq!(Role::from(Sender::User), Role::User);
        assert_eq!(Role::from(Sender::Ai), Role::Assistant);

        let history = vec![msg(Sender::User, "a"), msg(Sender::Ai, "b"), msg(Sender::User, "c")];
        let roles: Vec<Role> = build_outbound(&history, "d", "sys", 10)
            .into_iter()
            .map(|m| m.role)
            .collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant, Role::User, Role::User]);
    }

    #[test]
    fn test_custom_limit_is_respected() {
        let history: Vec<Message> = (0..5).map(|i| msg(Sender::User, &format!("m{}", i))).collect();
        let out = build_outbound(&history, "x", "sys", 2);

        assert_eq!(out.len(), 4);
        assert_eq!(out[1].content, "m3");
        assert_eq!(out[2].content, "m4");
    }

    #[test]
    fn test_generated_messages_have_increasing_ids() {
        let mut ids = IdGenerator::new();
        let a = ids.message(Sender::User, "one");
        let b = ids.message(Sender::Ai, "two");

        let a_id: i64 = a.id.parse().unwrap();
        let b_id: i64 = b.id.parse().unwrap();
        assert!(b_id > a_id);
        assert_eq!(b.sender, Sender::Ai);
    }

    #[test]
    fn test_roles_serialize_lowercase() {
        let json = serde_json::to_value(ChatMessage::assistant("ok")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "ok"}));
    }
}
