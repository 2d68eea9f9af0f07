use std::time::Duration;

use blog_core::{
    client::RpcStore,
    controller::{DraftState, PostViewController, ViewError},
    ledger::PostLedger,
    post::PostType,
    store::{PostStore, StoreError},
    wire::PostSubmission,
};
use tokio::net::TcpListener;

async fn spawn_server() -> RpcStore {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let socket = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, PostLedger::default()));
    RpcStore::new(socket)
}

#[tokio::test]
async fn create_edit_and_list_over_tcp() {
    let store = spawn_server().await;
    let mut controller = PostViewController::new(store, Duration::from_secs(5));
    controller.load_all().await.unwrap();
    assert!(controller.posts().is_empty());

    controller.open_create().unwrap();
    let draft = controller.draft_mut().unwrap();
    draft.title = "Hello".into();
    draft.content = "World".into();
    draft.image_url = "   ".into();
    let id = controller.submit().await.unwrap();

    assert_eq!(controller.state(), &DraftState::Idle);
    assert_eq!(controller.posts().len(), 1);
    let created = controller.posts()[0].clone();
    assert_eq!(created.id, id);
    assert_eq!(created.post_type, PostType::Standard);
    assert_eq!(created.image_url, None);
    assert!(created.timestamp > 0);

    controller.open_edit(id).unwrap();
    let draft = controller.draft_mut().unwrap();
    draft.post_type = PostType::Video;
    draft.video_url = "https://example.com/clip.mp4".into();
    controller.submit().await.unwrap();

    let edited = &controller.posts()[0];
    assert_eq!(edited.post_type, PostType::Video);
    assert_eq!(edited.video_url.as_deref(), Some("https://example.com/clip.mp4"));
    assert_eq!(edited.title, "Hello");
    assert_eq!(edited.timestamp, created.timestamp);
}

#[tokio::test]
async fn store_rejection_is_reported_verbatim() {
    let store = spawn_server().await;
    let post = PostSubmission {
        post_type: PostType::Standard,
        title: "Title".into(),
        content: "Body".into(),
        image_url: None,
        video_url: None,
    };

    let err = store.edit_post(3, &post).await.unwrap_err();
    assert_eq!(
        err,
        StoreError::rejected("Post does not exist with the given ID(3)")
    );

    // Blank content passes through the client unchecked; the store refuses it.
    let blank = PostSubmission {
        content: " ".into(),
        ..post
    };
    let err = store.create_post(&blank).await.unwrap_err();
    assert_eq!(err, StoreError::rejected("Content cannot be empty"));
    assert!(store.get_posts().await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_submit_over_tcp_keeps_draft() {
    let store = spawn_server().await;
    let mut controller = PostViewController::new(store, Duration::from_secs(5));
    controller.load_all().await.unwrap();

    controller.open_create().unwrap();
    let draft = controller.draft_mut().unwrap();
    draft.post_type = PostType::Video;
    draft.title = "Clip".into();
    draft.content = "desc".into();
    draft.image_url = "x".into();

    let err = controller.submit().await.unwrap_err();
    assert!(matches!(err, ViewError::Invalid(_)), "{err:?}");
    assert!(controller.store().get_posts().await.unwrap().is_empty());
    assert!(matches!(controller.state(), DraftState::Drafting(_)));
}

#[tokio::test]
async fn blank_image_url_edit_over_tcp_clears_it() {
    let store = spawn_server().await;
    let post = PostSubmission {
        post_type: PostType::Standard,
        title: "Pictured".into(),
        content: "Body".into(),
        image_url: Some("https://example.com/cat.png".into()),
        video_url: None,
    };
    let id = store.create_post(&post).await.unwrap();

    let mut controller = PostViewController::new(store, Duration::from_secs(5));
    controller.load_all().await.unwrap();
    controller.open_edit(id).unwrap();
    let draft = controller.draft_mut().unwrap();
    assert_eq!(draft.image_url, "https://example.com/cat.png");
    draft.image_url = "   ".into();
    draft.video_url = "   ".into();
    controller.submit().await.unwrap();

    let edited = &controller.posts()[0];
    assert_eq!(edited.post_type, PostType::Standard);
    assert_eq!(edited.image_url, None);
    assert_eq!(edited.video_url, None);
}
