//! End-to-end console flows against the in-memory backend
//!
//! Each test drives the console state machines the way the desktop app and
//! the CLI do, and checks both the resulting state and the calls the
//! backend observed.

use mdp_client::{InMemoryClient, MdpClient, Operation, RecordedCall};
use mdp_console::function::{FunctionEditor, FunctionWizard, WizardStep};
use mdp_console::list::ListState;
use mdp_console::{ConsoleError, FacetSearch, Notice, Severity};
use mdp_types::{FunctionDefinition, LinkType, OutputType, ParamType};
use serde_json::json;

fn fill_wizard(wizard: &mut FunctionWizard, api_name: &str) {
    wizard.basic.api_name = api_name.into();
    wizard.basic.display_name = "Order Count".into();
    wizard.next().unwrap();
    let idx = wizard.add_param();
    wizard.set_param_name(idx, "customer_id");
    wizard.set_param_type(idx, Some(ParamType::String));
    wizard.set_param_required(idx, true);
    wizard.output_type = OutputType::Integer;
    wizard.next().unwrap();
}

#[tokio::test]
async fn created_function_appears_after_list_refetch() {
    let client = InMemoryClient::seeded();
    let mut list: ListState<FunctionDefinition> = ListState::new();
    assert!(list.load(&client).await.is_none());
    assert_eq!(list.items().len(), 1);

    let mut wizard = FunctionWizard::new();
    fill_wizard(&mut wizard, "order_count");
    assert!(wizard.code_content.starts_with("def order_count(customer_id):"));

    let result = wizard.submit(&client, Some("proj-1")).await;
    assert_eq!(FunctionWizard::submit_notice(&result), Notice::success("Function created"));
    assert_eq!(wizard.step(), WizardStep::BasicInfo);

    list.load(&client).await;
    let created = list
        .items()
        .iter()
        .find(|f| f.api_name == "order_count")
        .expect("created function listed");
    assert_eq!(created.project_id.as_deref(), Some("proj-1"));
    assert_eq!(created.output_type, OutputType::Integer);
}

#[tokio::test]
async fn rejected_create_keeps_the_form_for_a_retry() {
    let client = InMemoryClient::seeded();
    let mut wizard = FunctionWizard::new();
    fill_wizard(&mut wizard, "order_total");

    let result = wizard.submit(&client, None).await;
    let notice = FunctionWizard::submit_notice(&result);
    assert_eq!(notice.severity, Severity::Error);
    assert_eq!(wizard.step(), WizardStep::Implementation);
    assert_eq!(wizard.basic.api_name, "order_total");
    assert!(!wizard.is_submitting());

    wizard.previous();
    wizard.previous();
    wizard.basic.api_name = "order_total_v2".into();
    wizard.next().unwrap();
    wizard.next().unwrap();
    assert!(wizard.submit(&client, None).await.is_ok());
    assert_eq!(client.calls_of(Operation::CreateFunction).len(), 2);
}

#[tokio::test]
async fn editor_saves_without_touching_api_name() {
    let client = InMemoryClient::seeded();
    let target = client.list_functions().await.unwrap().remove(0);

    let mut editor = FunctionEditor::new();
    assert!(editor.sync(Some(&target)));
    editor.display_name = "Order Total (net)".into();
    let idx = editor.add_param();
    editor.set_param_name(idx, "");

    // a later sync with the same id keeps local edits
    assert!(!editor.sync(Some(&target)));
    assert_eq!(editor.display_name, "Order Total (net)");

    let saved = editor.save(&client).await.unwrap();
    assert_eq!(saved.display_name, "Order Total (net)");
    assert_eq!(saved.api_name, target.api_name);
    assert!(!editor.is_open());

    let sent = client.calls_of(Operation::UpdateFunction);
    let RecordedCall::UpdateFunction { req, .. } = &sent[0] else {
        panic!("expected an update call");
    };
    assert_eq!(
        req.input_params_schema.as_ref().map(Vec::len),
        target.input_params_schema.as_ref().map(Vec::len)
    );
}

#[tokio::test]
async fn blank_display_name_blocks_save() {
    let client = InMemoryClient::seeded();
    let target = client.list_functions().await.unwrap().remove(0);
    let mut editor = FunctionEditor::new();
    editor.sync(Some(&target));
    editor.display_name = "   ".into();

    let err = editor.save(&client).await.unwrap_err();
    assert!(matches!(err, ConsoleError::Validation(_)));
    assert_eq!(editor.display_name_error(), Some("Please enter display name"));
    assert!(client.calls_of(Operation::UpdateFunction).is_empty());
}

#[tokio::test]
async fn dry_run_echoes_inputs_without_calling_backend() {
    let client = InMemoryClient::seeded();
    let mut wizard = FunctionWizard::new();
    fill_wizard(&mut wizard, "order_count");
    wizard.set_test_input("customer_id", json!("c-42"));

    let result = wizard.run_dry_run().clone();
    assert_eq!(result.status, "success");
    assert_eq!(result.inputs.get("customer_id"), Some(&json!("c-42")));
    assert!((10..=500).contains(&result.execution_time_ms));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn cancelled_delete_issues_no_request() {
    let client = InMemoryClient::seeded();
    let mut list: ListState<LinkType> = ListState::new();
    list.load(&client).await;

    let message = list.request_delete("lt-placed").unwrap().message();
    assert_eq!(message, "Are you sure you want to delete \"Customer Orders\"?");
    list.cancel_delete();

    assert!(client.calls_of(Operation::DeleteLinkType).is_empty());
    assert_eq!(list.items().len(), 1);
}

#[tokio::test]
async fn confirmed_delete_then_object_type_unblocked() {
    let client = InMemoryClient::seeded();
    let mut links: ListState<LinkType> = ListState::new();
    links.load(&client).await;
    links.request_delete("lt-placed");
    let notices = links.delete_confirmed(&client).await;
    assert_eq!(notices, vec![Notice::success("Link type deleted")]);
    assert!(links.items().is_empty());

    let mut types: ListState<mdp_types::ObjectType> = ListState::new();
    types.load(&client).await;
    types.request_delete("ot-order");
    let notices = types.delete_confirmed(&client).await;
    assert_eq!(notices, vec![Notice::success("Object type deleted")]);
}

#[tokio::test]
async fn clear_all_triggers_exactly_one_fetch() {
    let client = InMemoryClient::seeded();
    let mut search = FacetSearch::new();
    search.query_input = "order".into();
    search.submit().unwrap();
    search.toggle_facet("status", "active");
    search.refresh(&client).await;
    assert_eq!(search.total(), 2);

    search.clear_all();
    search.refresh(&client).await;
    // nothing left to fetch
    assert!(search.refresh(&client).await.is_none());

    let calls = client.calls_of(Operation::Search);
    assert_eq!(calls.len(), 2);
    let RecordedCall::Search(last) = &calls[1] else {
        panic!("expected a search call");
    };
    assert_eq!(last.query_text, None);
    assert_eq!(last.filters, None);
    assert_eq!(last.page, 1);
    assert_eq!(search.total(), 4);
}
