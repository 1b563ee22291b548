mod common;

use common::{remote_post, remote_user, services, wait_for, ScriptedApi};
use socialhub::viewmodel::feed::FEED_ERROR_FALLBACK;
use socialhub::viewmodel::FeedViewModel;

#[tokio::test]
async fn sync_enriches_each_author_once() {
    let api = ScriptedApi::new();
    api.with_posts(vec![remote_post(1, 9, " first "), remote_post(2, 9, "second")]);
    api.with_user(remote_user(9, "Emily", "emilys"));
    let services = services(&api);

    let vm = FeedViewModel::new(services.clone());
    let mut rx = vm.state();
    let state = wait_for(&mut rx, |s| {
        !s.is_loading && s.posts.len() == 2 && s.posts.iter().all(|p| p.handle == "@emilys")
    })
    .await;

    assert_eq!(state.posts[0].id, 1);
    assert_eq!(state.posts[0].body, "first");
    assert_eq!(state.posts[0].author, "Emily Tester");
    assert_eq!(state.posts[0].stamp, "now");
    assert_eq!(state.posts[1].stamp, "1m");
    assert_eq!(state.error_message, None);
    assert_eq!(api.count("get_user "), 1);

    // A later session upserts the same rows and finds the author cached
    drop(vm);
    let vm = FeedViewModel::new(services.clone());
    let mut rx = vm.state();
    wait_for(&mut rx, |s| !s.is_loading && s.posts.len() == 2).await;
    assert_eq!(api.count("get_posts "), 2);
    assert_eq!(api.count("get_user "), 1);
    assert_eq!(services.cache.timeline(50).await.unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_authors_show_placeholders() {
    let api = ScriptedApi::new();
    api.with_posts(vec![remote_post(1, 77, "who wrote this")]);
    let vm = FeedViewModel::new(services(&api));
    let mut rx = vm.state();

    let state = wait_for(&mut rx, |s| !s.is_loading && !s.posts.is_empty()).await;
    assert_eq!(state.posts[0].author, "User 77");
    assert_eq!(state.posts[0].handle, "@user77");
    assert_eq!(api.count("get_user 77"), 1);
}

#[tokio::test]
async fn failed_refresh_keeps_cached_posts() {
    let api = ScriptedApi::new();
    api.with_posts(vec![remote_post(1, 9, "cached")]);
    let services = services(&api);
    services.post_synchronizer().refresh_posts(20).await.unwrap();

    api.failing_posts("gateway timeout");
    let vm = FeedViewModel::new(services);
    let mut rx = vm.state();

    let state = wait_for(&mut rx, |s| !s.is_loading && s.error_message.is_some()).await;
    assert_eq!(state.error_message.as_deref(), Some("API error: gateway timeout"));
    assert_eq!(state.posts.len(), 1);
    assert_eq!(state.posts[0].body, "cached");
}

#[tokio::test]
async fn blank_error_detail_uses_fallback_message() {
    let api = ScriptedApi::new();
    api.failing_posts("");
    let vm = FeedViewModel::new(services(&api));
    let mut rx = vm.state();

    let state = wait_for(&mut rx, |s| !s.is_loading && s.error_message.is_some()).await;
    assert_eq!(state.error_message.as_deref(), Some(FEED_ERROR_FALLBACK));
}

#[tokio::test]
async fn own_posts_follow_the_session() {
    let api = ScriptedApi::new();
    api.with_posts(vec![remote_post(1, 9, "mine"), remote_post(2, 4, "theirs")]);
    let services = services(&api);
    let vm = FeedViewModel::new(services.clone());
    let mut rx = vm.state();

    let state = wait_for(&mut rx, |s| !s.is_loading && s.posts.len() == 2).await;
    assert!(state.posts.iter().all(|p| !p.is_own));

    services.current_user.set_current_user_id(9).unwrap();
    let state = wait_for(&mut rx, |s| s.current_user_id == Some(9)).await;
    assert!(state.posts[0].is_own);
    assert!(!state.posts[1].is_own);
}

#[tokio::test]
async fn local_writes_appear_without_refresh() {
    let api = ScriptedApi::new();
    let services = services(&api);
    let vm = FeedViewModel::new(services.clone());
    let mut rx = vm.state();
    wait_for(&mut rx, |s| !s.is_loading).await;

    services
        .post_synchronizer()
        .create_local_post(1001, "written offline")
        .await
        .unwrap();

    let state = wait_for(&mut rx, |s| s.posts.len() == 1).await;
    assert_eq!(state.posts[0].body, "written offline");
}
