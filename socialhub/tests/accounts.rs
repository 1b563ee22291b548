mod common;

use common::{services, wait_for, ScriptedApi};
use socialhub::validation::USERNAME_TAKEN_ERROR;
use socialhub::viewmodel::{
    CreatePostViewModel, CreateUserViewModel, EditUserViewModel, FeedViewModel, ProfileViewModel,
};

#[tokio::test]
async fn taken_username_is_rejected_without_insert() {
    let api = ScriptedApi::new();
    let services = services(&api);

    let mut first = CreateUserViewModel::new(services.clone());
    first.on_name_change("Ann");
    first.on_username_change("ann");
    let ann = first.register().await.unwrap().expect("first registration");

    let mut second = CreateUserViewModel::new(services.clone());
    second.on_name_change("Impostor");
    second.on_username_change("ann");
    assert_eq!(second.register().await.unwrap(), None);
    assert_eq!(second.ui_state().username_error.as_deref(), Some(USERNAME_TAKEN_ERROR));

    assert_eq!(services.cache.users().await.unwrap().len(), 1);
    assert_eq!(services.current_user.current_user_id(), Some(ann.id));
}

#[tokio::test]
async fn registered_user_posts_show_as_own() {
    let api = ScriptedApi::new();
    let services = services(&api);

    let mut register = CreateUserViewModel::new(services.clone());
    register.on_name_change("Bo");
    register.on_username_change("bo_dev");
    let bo = register.register().await.unwrap().unwrap();

    let mut composer = CreatePostViewModel::new(services.clone());
    composer.on_content_change("hello from bo");
    composer.submit().await.unwrap().expect("post saved");

    let feed = FeedViewModel::new(services.clone());
    let mut rx = feed.state();
    let state = wait_for(&mut rx, |s| !s.is_loading && s.posts.len() == 1).await;
    let post = &state.posts[0];
    assert!(post.is_own);
    assert_eq!(post.author, "Bo");
    assert_eq!(post.handle, "@bo_dev");
    assert_eq!(post.user_id, bo.id);
}

#[tokio::test]
async fn deleting_account_signs_out_and_keeps_posts() {
    let api = ScriptedApi::new();
    let services = services(&api);

    let mut register = CreateUserViewModel::new(services.clone());
    register.on_name_change("Cy");
    register.on_username_change("cy");
    register.register().await.unwrap().unwrap();

    let mut composer = CreatePostViewModel::new(services.clone());
    composer.on_content_change("last words");
    composer.submit().await.unwrap().unwrap();

    let profile = ProfileViewModel::current(services.clone());
    let mut rx = profile.state();
    wait_for(&mut rx, |s| s.user.is_some() && s.posts.len() == 1).await;

    let mut editor = EditUserViewModel::load(services.clone()).await.unwrap();
    assert!(editor.delete_account().await.unwrap());

    let state = wait_for(&mut rx, |s| s.user.is_none()).await;
    assert!(state.posts.is_empty());
    assert_eq!(services.current_user.current_user_id(), None);
    assert_eq!(services.cache.timeline(10).await.unwrap().len(), 1);
}
