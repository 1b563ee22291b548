use std::sync::Arc;

use tokio::sync::watch;

use crate::cache::LocalCache;
use crate::error::Result;
use crate::logging::SYNC;
use crate::services::Services;
use crate::sync::PostSynchronizer;
use crate::task_scope::{AbortOnDrop, TaskScope};
use socialhub_store::Table;
use socialhub_types::{Post, User};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUiState {
    /// `None` for guests and for ids not in the cache
    pub user: Option<User>,
    pub posts: Vec<Post>,
    pub is_loading: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProfileTarget {
    User(i64),
    CurrentUser,
}

/// A user's profile header and posts.
pub struct ProfileViewModel {
    services: Services,
    state: watch::Receiver<ProfileUiState>,
    _scope: TaskScope,
}

impl ProfileViewModel {
    /// Profile of a fixed user. Must be called from within a tokio runtime.
    pub fn for_user(services: Services, user_id: i64) -> Self {
        Self::start(services, ProfileTarget::User(user_id))
    }

    /// Profile of whoever the session says is signed in, following changes.
    pub fn current(services: Services) -> Self {
        Self::start(services, ProfileTarget::CurrentUser)
    }

    fn start(services: Services, target: ProfileTarget) -> Self {
        let (state_tx, state) = watch::channel(ProfileUiState {
            is_loading: true,
            ..Default::default()
        });
        let scope = TaskScope::new();
        scope.spawn(compose_profile(services.clone(), target, state_tx));

        Self {
            services,
            state,
            _scope: scope,
        }
    }

    pub fn state(&self) -> watch::Receiver<ProfileUiState> {
        self.state.clone()
    }

    pub fn snapshot(&self) -> ProfileUiState {
        self.state.borrow().clone()
    }

    /// Forget the current user. Cached rows stay.
    pub fn logout(&self) -> Result<()> {
        self.services.current_user.clear_current_user_id()?;
        Ok(())
    }
}

async fn compose_profile(
    services: Services,
    target: ProfileTarget,
    state: watch::Sender<ProfileUiState>,
) {
    let cache = services.cache.clone();
    let mut posts_changed = cache.subscribe(Table::Posts);
    let mut users_changed = cache.subscribe(Table::Users);
    let mut session = services.current_user.subscribe();

    let refresh_flag = RefreshFlag::new();
    let mut refreshing = refresh_flag.subscribe();
    let mut refresh_task: Option<AbortOnDrop> = None;
    let mut generation = 0u64;
    let mut shown: Option<Option<i64>> = None;

    loop {
        posts_changed.borrow_and_update();
        users_changed.borrow_and_update();
        let user_id = match target {
            ProfileTarget::User(user_id) => Some(user_id),
            ProfileTarget::CurrentUser => *session.borrow_and_update(),
        };

        // A different user: drop the old refresh and start one for the new id
        if shown != Some(user_id) {
            shown = Some(user_id);
            drop(refresh_task.take());
            match user_id {
                Some(user_id) => {
                    generation += 1;
                    refresh_flag.begin(generation);
                    refresh_task = Some(AbortOnDrop::spawn(refresh_profile(
                        services.post_synchronizer(),
                        user_id,
                        refresh_flag.clone(),
                        generation,
                    )));
                }
                None => refresh_flag.clear(),
            }
        }

        let is_loading = refreshing.borrow_and_update().is_some();
        match load_profile(&cache, user_id).await {
            Ok((user, posts)) => {
                state.send_replace(ProfileUiState {
                    user,
                    posts,
                    is_loading,
                });
            }
            Err(e) => {
                log::warn!(target: SYNC, "Failed to read profile from cache: {}", e);
                state.send_modify(|snapshot| snapshot.is_loading = is_loading);
            }
        }

        tokio::select! {
            changed = posts_changed.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = users_changed.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = session.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = refreshing.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
}

/// Loading flag tagged with the generation of the refresh that owns it.
///
/// A superseded refresh that finishes late cannot clear the flag of the
/// refresh that replaced it.
#[derive(Clone)]
struct RefreshFlag {
    active: Arc<watch::Sender<Option<u64>>>,
}

impl RefreshFlag {
    fn new() -> Self {
        Self {
            active: Arc::new(watch::channel(None).0),
        }
    }

    fn subscribe(&self) -> watch::Receiver<Option<u64>> {
        self.active.subscribe()
    }

    fn begin(&self, generation: u64) {
        self.active.send_replace(Some(generation));
    }

    /// Clear the flag if `generation` still owns it
    fn finish(&self, generation: u64) -> bool {
        self.active.send_if_modified(|active| {
            if *active == Some(generation) {
                *active = None;
                true
            } else {
                false
            }
        })
    }

    fn clear(&self) {
        self.active.send_replace(None);
    }

    #[cfg(test)]
    fn is_loading(&self) -> bool {
        self.active.borrow().is_some()
    }
}

async fn refresh_profile(
    synchronizer: PostSynchronizer,
    user_id: i64,
    flag: RefreshFlag,
    generation: u64,
) {
    if let Err(e) = synchronizer.refresh_posts_for_user(user_id).await {
        log::warn!(target: SYNC, "Profile refresh for user {} failed: {}", user_id, e);
    }
    flag.finish(generation);
}

async fn load_profile(cache: &LocalCache, user_id: Option<i64>) -> Result<(Option<User>, Vec<Post>)> {
    let Some(user_id) = user_id else {
        return Ok((None, Vec::new()));
    };
    let user = cache.get_user(user_id).await?;
    let posts = cache.posts_by_user(user_id).await?;
    Ok((user, posts))
}
