use drive_publish_core::contract::{ApiResponse, LinkRequest, LinkScope, LinkType, MockDriveApi};
use drive_publish_core::credential::Credential;
use drive_publish_core::error::{ErrorKind, PublishError};
use drive_publish_core::remote_path::RemotePath;
use drive_publish_core::share::{create_link, share_folder, share_path};

fn credential() -> Credential {
    Credential::new("token", "user-1", None)
}

#[tokio::test]
async fn folder_is_resolved_then_shared_view_only() {
    let mut api = MockDriveApi::new();
    api.expect_get_item()
        .withf(|_, path: &RemotePath| path.segments() == ["releases", "v1"])
        .times(1)
        .returning(|_, _| Ok(ApiResponse::new(200, r#"{"id":"FOLDER-1","folder":{}}"#)));
    api.expect_create_link()
        .withf(|_, item_id: &str, request: &LinkRequest| {
            item_id == "FOLDER-1"
                && request.link_type == LinkType::View
                && request.scope == LinkScope::Anonymous
        })
        .times(1)
        .returning(|_, _, _| {
            Ok(ApiResponse::new(
                201,
                r#"{"link":{"type":"view","scope":"anonymous","webUrl":"https://1drv.ms/f/s!abc"}}"#,
            ))
        });

    let link = share_folder(&api, &credential(), &RemotePath::from_segments(["releases", "v1"]))
        .await
        .unwrap();
    assert_eq!(link.web_url, "https://1drv.ms/f/s!abc");
    assert_eq!(link.link_type, LinkType::View);
}

#[tokio::test]
async fn lookup_without_id_never_creates_a_link() {
    let mut api = MockDriveApi::new();
    api.expect_get_item()
        .times(1)
        .returning(|_, _| Ok(ApiResponse::new(200, r#"{"name":"v1"}"#)));
    api.expect_create_link().never();

    let err = share_folder(&api, &credential(), &RemotePath::parse("releases/v1"))
        .await
        .unwrap_err();
    match err {
        PublishError::Lookup { path, status, .. } => {
            assert_eq!(path, "releases/v1");
            assert_eq!(status, 200);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn lookup_not_found_never_creates_a_link() {
    let mut api = MockDriveApi::new();
    api.expect_get_item().times(1).returning(|_, _| {
        Ok(ApiResponse::new(
            404,
            r#"{"error":{"code":"itemNotFound"}}"#,
        ))
    });
    api.expect_create_link().never();

    let err = share_folder(&api, &credential(), &RemotePath::parse("missing"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LookupFailure);
}

#[tokio::test]
async fn unparseable_link_response_is_malformed() {
    let mut api = MockDriveApi::new();
    api.expect_create_link()
        .returning(|_, _, _| Ok(ApiResponse::new(502, "Bad Gateway")));

    let err = create_link(&api, &credential(), "ITEM", LinkType::View)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
}

#[tokio::test]
async fn link_error_body_is_reported() {
    let mut api = MockDriveApi::new();
    api.expect_create_link().returning(|_, _, _| {
        Ok(ApiResponse::new(
            403,
            r#"{"error":{"code":"accessDenied"}}"#,
        ))
    });

    match create_link(&api, &credential(), "ITEM", LinkType::Edit)
        .await
        .unwrap_err()
    {
        PublishError::ShareLink { status, body } => {
            assert_eq!(status, 403);
            assert!(body.contains("accessDenied"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn success_status_without_link_object_fails() {
    let mut api = MockDriveApi::new();
    api.expect_create_link()
        .returning(|_, _, _| Ok(ApiResponse::new(200, r#"{"id":"perm-1"}"#)));

    let err = create_link(&api, &credential(), "ITEM", LinkType::View)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShareLinkFailure);
}

#[tokio::test]
async fn files_can_be_shared_by_path_with_edit_links() {
    let mut api = MockDriveApi::new();
    api.expect_get_item()
        .withf(|_, path: &RemotePath| path.to_string() == "releases/v1/app.zip")
        .returning(|_, _| Ok(ApiResponse::new(200, r#"{"id":"FILE-9"}"#)));
    api.expect_create_link()
        .withf(|_, item_id: &str, request: &LinkRequest| {
            item_id == "FILE-9" && request.link_type == LinkType::Edit
        })
        .returning(|_, _, _| {
            Ok(ApiResponse::new(
                200,
                r#"{"link":{"webUrl":"https://1drv.ms/u/s!edit"}}"#,
            ))
        });

    let link = share_path(
        &api,
        &credential(),
        &RemotePath::parse("releases/v1/app.zip"),
        LinkType::Edit,
    )
    .await
    .unwrap();
    assert_eq!(link.web_url, "https://1drv.ms/u/s!edit");
}
