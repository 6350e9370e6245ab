// tests/page_tests.rs

mod common;

use common::{item, mount_items, test_config, TestPage};
use settings_sync::page::Layout;
use settings_sync::schema::DEFAULT_BUTTON_LABEL;
use settings_sync::{FieldDescriptor, FieldKind, GroupId, GroupSchema, SyncError};
use wiremock::MockServer;

#[tokio::test]
async fn test_form_follows_registry_order_and_layout() {
    let server = MockServer::start().await;
    mount_items(&server, vec![item("qbittorrent_url", "http://qb", 5)]).await;

    let test = TestPage::new(&server);
    test.page.activate().await.unwrap();
    let form = test.page.form();

    assert_eq!(form.len(), 11);
    assert_eq!(form[0].id, GroupId::new("aria2"));
    assert_eq!(form[0].layout, Layout::Grid);
    assert_eq!(form[0].button_label, DEFAULT_BUTTON_LABEL);
    assert_eq!(form[1].fields[0].value, "http://qb");

    let open_123 = form.iter().find(|g| g.id.as_str() == "123_open").unwrap();
    assert_eq!(open_123.layout, Layout::Stacked);
    assert_eq!(open_123.fields[0].kind, FieldKind::Directory);
    assert_eq!(open_123.fields[1].kind, FieldKind::Text);
    assert!(form.iter().all(|g| !g.busy));
}

#[tokio::test]
async fn test_pick_directory_stores_choice() {
    let server = MockServer::start().await;
    mount_items(&server, vec![]).await;

    let test = TestPage::with_picker(&server, Some("/offline/thunder"));
    test.page.activate().await.unwrap();

    let chosen = test.page.pick_directory("thunder_temp_dir").await.unwrap();

    assert_eq!(chosen.as_deref(), Some("/offline/thunder"));
    assert_eq!(test.page.get_value("thunder_temp_dir"), "/offline/thunder");
}

#[tokio::test]
async fn test_dismissed_picker_keeps_value() {
    let server = MockServer::start().await;
    mount_items(&server, vec![item("pikpak_temp_dir", "/keep", 5)]).await;

    let test = TestPage::with_picker(&server, None);
    test.page.activate().await.unwrap();

    assert_eq!(test.page.pick_directory("pikpak_temp_dir").await.unwrap(), None);
    assert_eq!(test.page.get_value("pikpak_temp_dir"), "/keep");
}

#[tokio::test]
async fn test_pick_directory_rejects_text_fields() {
    let server = MockServer::start().await;
    let test = TestPage::with_picker(&server, Some("/x"));

    let err = test.page.pick_directory("aria2_uri").await.unwrap_err();

    assert!(matches!(err, SyncError::NotADirectoryField { ref key } if key == "aria2_uri"));
    assert_eq!(test.page.get_value("aria2_uri"), "");
}

#[tokio::test]
async fn test_subscribers_follow_hydration() {
    let server = MockServer::start().await;
    mount_items(&server, vec![item("transmission_uri", "http://tr:9091", 5)]).await;

    let test = TestPage::new(&server);
    let mut rx = test.page.subscribe("transmission_uri");
    test.page.activate().await.unwrap();

    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), "http://tr:9091");
}

#[tokio::test]
async fn test_custom_registry_drives_fetch_and_form() {
    let server = MockServer::start().await;
    mount_items(&server, vec![item("s3_temp_dir", "/s3", 9)]).await;

    let mut config = test_config(&server);
    config.groups = vec![GroupSchema {
        id: GroupId::new("s3"),
        fetch_group: GroupId::new("9"),
        title_id: "settings_other.s3".to_string(),
        endpoint: "/admin/setting/set_s3".to_string(),
        fields: vec![FieldDescriptor::directory("s3_temp_dir", "s3_temp_dir")],
        button_label_id: Some("settings_other.apply".to_string()),
    }];
    let test = TestPage::with_config(config, None);
    test.page.activate().await.unwrap();

    assert_eq!(
        test.page.fetch_groups(),
        &[GroupId::new("9"), GroupId::new("0")]
    );
    let form = test.page.form();
    assert_eq!(form.len(), 1);
    assert_eq!(form[0].button_label, "settings_other.apply");
    assert_eq!(form[0].fields[0].value, "/s3");
}

#[tokio::test]
async fn test_form_exposes_item_help() {
    let server = MockServer::start().await;
    let mut with_help = item("aria2_secret", "s", 5);
    with_help["help"] = serde_json::Value::String("RPC secret".to_string());
    mount_items(&server, vec![with_help]).await;

    let test = TestPage::new(&server);
    test.page.activate().await.unwrap();

    let aria2 = &test.page.form()[0];
    assert_eq!(aria2.fields[1].help.as_deref(), Some("RPC secret"));
}
