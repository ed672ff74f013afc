mod common;

use common::{temp_db_path, test_config};
use mediashelf::db::{NewUser, Store, is_unique_violation};
use mediashelf::domain::MediaKind;
use mediashelf::models::media::MediaInput;

struct TempStore {
    store: Store,
    path: std::path::PathBuf,
}

impl Drop for TempStore {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

async fn open_store() -> (TempStore, mediashelf::config::Config) {
    let path = temp_db_path();
    let config = test_config(&path);
    let store = Store::new(&config.general.database_path)
        .await
        .expect("Failed to open store");
    (TempStore { store, path }, config)
}

fn input(title: &str) -> MediaInput {
    MediaInput {
        title: title.to_string(),
        year_released: None,
        seasons: None,
        episodes: None,
        description: None,
        genre_ids: Vec::new(),
    }
}

#[tokio::test]
async fn test_deleting_a_user_removes_their_links() {
    let (db, config) = open_store().await;
    let store = &db.store;

    let user = store
        .create_user(
            NewUser {
                username: "leaving",
                email: None,
                password: "correct horse",
            },
            &config.security,
        )
        .await
        .unwrap();

    for kind in MediaKind::ALL {
        let descriptor = kind.descriptor();
        let id = store.create_media(descriptor, &input("Shared")).await.unwrap();
        assert!(store.toggle_link(descriptor, user.id, id).await.unwrap());
        assert_eq!(store.library_count(descriptor, user.id).await.unwrap(), 1);
    }

    assert!(store.delete_user("leaving").await.unwrap());
    assert!(store.get_user_by_id(user.id).await.unwrap().is_none());

    for kind in MediaKind::ALL {
        let descriptor = kind.descriptor();
        assert_eq!(store.library_count(descriptor, user.id).await.unwrap(), 0);
        assert!(store.media_exists(descriptor, 1).await.unwrap());
    }
}

#[tokio::test]
async fn test_toggle_alternates_membership() {
    let (db, config) = open_store().await;
    let store = &db.store;
    let descriptor = MediaKind::Cartoon.descriptor();

    let user = store
        .create_user(
            NewUser {
                username: "toggler",
                email: Some("t@example.com"),
                password: "correct horse",
            },
            &config.security,
        )
        .await
        .unwrap();
    let id = store.create_media(descriptor, &input("Gumball")).await.unwrap();

    assert!(store.toggle_link(descriptor, user.id, id).await.unwrap());
    assert!(store.get_link(descriptor, user.id, id).await.unwrap().is_some());

    assert!(!store.toggle_link(descriptor, user.id, id).await.unwrap());
    assert!(store.get_link(descriptor, user.id, id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_kinds_do_not_share_ids() {
    let (db, _config) = open_store().await;
    let store = &db.store;

    let movie = store
        .create_media(MediaKind::Movie.descriptor(), &input("Movie one"))
        .await
        .unwrap();
    let anime = store
        .create_media(MediaKind::Anime.descriptor(), &input("Anime one"))
        .await
        .unwrap();
    assert_eq!(movie, anime);

    assert!(store.delete_media(MediaKind::Movie.descriptor(), movie).await.unwrap());
    assert!(store.media_exists(MediaKind::Anime.descriptor(), anime).await.unwrap());
}

#[tokio::test]
async fn test_password_and_api_key_verification() {
    let (db, config) = open_store().await;
    let store = &db.store;

    let user = store
        .create_user(
            NewUser {
                username: "verify",
                email: None,
                password: "correct horse",
            },
            &config.security,
        )
        .await
        .unwrap();

    assert!(store.verify_user_password("verify", "correct horse").await.unwrap().is_some());
    assert!(store.verify_user_password("verify", "wrong").await.unwrap().is_none());
    assert!(store.verify_user_password("nobody", "correct horse").await.unwrap().is_none());

    let by_key = store.verify_api_key(&user.api_key).await.unwrap();
    assert_eq!(by_key.map(|u| u.id), Some(user.id));
    assert!(store.verify_api_key("not-a-key").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_inserts_are_unique_violations() {
    let (db, config) = open_store().await;
    let store = &db.store;

    store.create_genre("Émotion").await.unwrap();
    let err = store.create_genre("émotion").await.unwrap_err();
    assert!(is_unique_violation(&err), "{err:?}");

    let new_user = || NewUser {
        username: "twice",
        email: None,
        password: "correct horse",
    };
    store.create_user(new_user(), &config.security).await.unwrap();
    let err = store
        .create_user(new_user(), &config.security)
        .await
        .unwrap_err();
    assert!(is_unique_violation(&err), "{err:?}");

    let other = store.create_genre("Horror").await;
    assert!(other.is_ok());
}
