use crate::config::ChatModelConfig;
use crate::factory::ChatModelFactory;
use crate::message::ChatMessage;
use crate::mock::MockChatModel;
use crate::provider::ChatModel;

#[tokio::test]
async fn mock_chat_model_returns_canned_reply_and_records_transcript() {
    let model = MockChatModel::new("Final Recommendation: BUY");
    let messages = vec![
        ChatMessage::system("you are a risk manager"),
        ChatMessage::human("summarize the debate"),
    ];

    let reply = model.invoke(&messages).await.unwrap();
    assert_eq!(reply, "Final Recommendation: BUY");
    assert_eq!(model.call_count(), 1);
    assert_eq!(model.transcripts().len(), 1);
    assert_eq!(model.transcripts()[0], messages);
}

#[tokio::test]
async fn mock_chat_model_sequence_advances_then_holds_last() {
    let model = MockChatModel::sequence(vec!["first", "second"]);
    assert_eq!(model.invoke(&[]).await.unwrap(), "first");
    assert_eq!(model.invoke(&[]).await.unwrap(), "second");
    assert_eq!(model.invoke(&[]).await.unwrap(), "second");
}

#[test]
fn factory_resolves_gemini_prefix_to_google_provider() {
    let config = ChatModelConfig {
        google_api_key: Some("test-key".into()),
        request_timeout: ChatModelConfig::default_request_timeout(),
        ..Default::default()
    };
    let factory = ChatModelFactory::new(config).unwrap();
    let model = factory.create_chat_model("gemini-1.5-pro", 1.0).unwrap();
    assert_eq!(model.backend_name(), "google");
}

#[test]
fn factory_resolves_grok_prefix_to_xai_provider() {
    let config = ChatModelConfig {
        grok_api_key: Some("test-key".into()),
        request_timeout: ChatModelConfig::default_request_timeout(),
        ..Default::default()
    };
    let factory = ChatModelFactory::new(config).unwrap();
    let model = factory.create_chat_model("grok-beta", 1.0).unwrap();
    assert_eq!(model.backend_name(), "xai");
}

#[test]
fn factory_resolves_allowlisted_model_id_without_matching_prefix() {
    let config = ChatModelConfig {
        google_api_key: Some("test-key".into()),
        google_model_allowlist: vec!["custom-research-model".into()],
        request_timeout: ChatModelConfig::default_request_timeout(),
        ..Default::default()
    };
    let factory = ChatModelFactory::new(config).unwrap();
    let model = factory
        .create_chat_model("custom-research-model", 1.0)
        .unwrap();
    assert_eq!(model.backend_name(), "google");
}

#[test]
fn factory_defaults_to_openai_compatible_provider() {
    let config = ChatModelConfig {
        openai_api_key: Some("test-key".into()),
        request_timeout: ChatModelConfig::default_request_timeout(),
        ..Default::default()
    };
    let factory = ChatModelFactory::new(config).unwrap();
    let model = factory.create_chat_model("gpt-4o", 1.0).unwrap();
    assert_eq!(model.backend_name(), "openai");
}

#[test]
fn factory_raises_configuration_error_on_missing_credentials() {
    let config = ChatModelConfig {
        request_timeout: ChatModelConfig::default_request_timeout(),
        ..Default::default()
    };
    let factory = ChatModelFactory::new(config).unwrap();
    let err = factory.create_chat_model("gpt-4o", 1.0).unwrap_err();
    assert!(matches!(err, crate::error::ChatModelError::Configuration(_)));
}
