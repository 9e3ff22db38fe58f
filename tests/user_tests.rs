mod common;

use reqwest::StatusCode;
use serde_json::json;

use backoffice::db;
use backoffice::listing::Pager;
use backoffice::models::Status;

use common::{cleanup, spawn_app, spawn_app_with_page_size};

#[tokio::test]
async fn listing_shows_active_users_with_org_and_role_names() {
    let app = spawn_app().await;
    let (_, token) = app.bootstrap_admin().await;

    let org = db::orgs::create(&app.pool, "Acme").await.unwrap();
    let role_id = app.seed_role("Editor", &["read-user"]).await;
    app.seed_user("Alice", "alice", Some(org.id), Some(role_id))
        .await;

    let resp = app.get_auth("/admin/users", &token).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Alice"));
    assert!(body.contains("Acme"));
    assert!(body.contains("Editor"));

    cleanup(app).await;
}

#[tokio::test]
async fn search_matches_own_columns() {
    let app = spawn_app().await;
    app.bootstrap_admin().await;
    app.seed_user("Alice Cooper", "acooper", None, None).await;
    app.seed_user("Bob Stone", "bstone", None, None).await;

    let page = db::users::list(&app.pool, Some("cooper"), Pager::new(25), 1)
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "Alice Cooper");

    // Email matches too, since the term is a substring of acooper@test.com.
    let page = db::users::list(&app.pool, Some("bstone@test"), Pager::new(25), 1)
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "Bob Stone");

    cleanup(app).await;
}

#[tokio::test]
async fn search_matches_related_org_and_role_names() {
    let app = spawn_app().await;
    app.bootstrap_admin().await;

    let org = db::orgs::create(&app.pool, "Globex").await.unwrap();
    let role_id = app.seed_role("Auditor", &["read-user"]).await;
    app.seed_user("Carol", "carol", Some(org.id), None).await;
    app.seed_user("Dave", "dave", None, Some(role_id)).await;

    // Org name match pulls in Carol only.
    let page = db::users::list(&app.pool, Some("globex"), Pager::new(25), 1)
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "Carol");

    // Role name match pulls in Dave only, even though he has no org.
    let page = db::users::list(&app.pool, Some("auditor"), Pager::new(25), 1)
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "Dave");

    cleanup(app).await;
}

#[tokio::test]
async fn search_excludes_non_matching_rows() {
    let app = spawn_app().await;
    app.bootstrap_admin().await;
    app.seed_user("Erin", "erin", None, None).await;

    let page = db::users::list(&app.pool, Some("zzz-no-such-term"), Pager::new(25), 1)
        .await
        .unwrap();
    assert_eq!(page.total, 0);
    assert!(page.items.is_empty());

    cleanup(app).await;
}

#[tokio::test]
async fn inactive_users_never_appear_in_listings() {
    let app = spawn_app().await;
    let (admin, _) = app.bootstrap_admin().await;
    let soft = app.seed_user("Soft Deleted", "soft", None, None).await;
    let bulk = app.seed_user("Bulk Removed", "bulk", None, None).await;

    db::users::soft_delete(&app.pool, soft.id, admin.id)
        .await
        .unwrap();
    db::users::bulk_remove(&app.pool, &[bulk.id], admin.id)
        .await
        .unwrap();

    let page = db::users::list(&app.pool, None, Pager::new(25), 1)
        .await
        .unwrap();
    assert!(page.items.iter().all(|u| u.id != soft.id && u.id != bulk.id));
    assert_eq!(page.total, 1); // only the admin remains

    cleanup(app).await;
}

#[tokio::test]
async fn pagination_orders_by_name_and_pages_consistently() {
    let app = spawn_app_with_page_size(2).await;
    let (_, token) = app.bootstrap_admin().await; // "ZZ Admin" sorts last
    for (name, username) in [
        ("Alice", "alice"),
        ("Bob", "bob"),
        ("Carol", "carol"),
        ("Dave", "dave"),
        ("Erin", "erin"),
    ] {
        app.seed_user(name, username, None, None).await;
    }

    let page1 = db::users::list(&app.pool, None, Pager::new(2), 1)
        .await
        .unwrap();
    assert_eq!(page1.total, 6);
    assert_eq!(page1.total_pages(), 3);
    let names: Vec<_> = page1.items.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, ["Alice", "Bob"]);
    assert_eq!(page1.first_item(), 1);
    assert_eq!(page1.last_item(), 2);
    assert!(!page1.has_prev());
    assert!(page1.has_next());

    let page3 = db::users::list(&app.pool, None, Pager::new(2), 3)
        .await
        .unwrap();
    let names: Vec<_> = page3.items.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, ["Erin", "ZZ Admin"]);
    assert!(page3.has_prev());
    assert!(!page3.has_next());

    // The rendered page carries the footer counts and a next link.
    let resp = app.get_auth("/admin/users?page=1", &token).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Showing 1 to 2 of 6"));
    assert!(body.contains("page=2"));

    cleanup(app).await;
}

#[tokio::test]
async fn listing_tolerates_absurd_page_numbers() {
    let app = spawn_app().await;
    let (_, token) = app.bootstrap_admin().await;

    let resp = app
        .get_auth("/admin/users?page=9223372036854775807", &token)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Showing 0 to 0 of 1"));

    cleanup(app).await;
}

#[tokio::test]
async fn create_binds_role_by_resolved_name() {
    let app = spawn_app().await;
    let (_, token) = app.bootstrap_admin().await;
    let org = db::orgs::create(&app.pool, "Initech").await.unwrap();
    let role_id = app.seed_role("Editor", &["read-user"]).await;

    let resp = app
        .post_form(
            "/admin/users",
            &token,
            &[
                ("name", "Frank"),
                ("username", "frank"),
                ("email", "frank@example.com"),
                ("phone", ""),
                ("password", "super-secret-pw"),
                ("org_id", &org.id.to_string()),
                ("role_id", &role_id.to_string()),
            ],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let user = db::users::find_by_username(&app.pool, "frank")
        .await
        .unwrap()
        .expect("user was not created");
    assert_eq!(user.org_id, Some(org.id));
    assert_eq!(user.status, Status::Active);
    assert_eq!(user.phone, None); // blank phone is stored as null

    let role = db::roles::role_for_user(&app.pool, user.id)
        .await
        .unwrap()
        .expect("role membership missing");
    assert_eq!(role.name, "Editor");

    cleanup(app).await;
}

#[tokio::test]
async fn create_with_unknown_role_persists_nothing() {
    let app = spawn_app().await;
    let (_, token) = app.bootstrap_admin().await;

    let resp = app
        .post_form(
            "/admin/users",
            &token,
            &[
                ("name", "Ghost"),
                ("username", "ghost"),
                ("email", "ghost@example.com"),
                ("password", "super-secret-pw"),
                ("role_id", "999999"),
            ],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let user = db::users::find_by_username(&app.pool, "ghost").await.unwrap();
    assert!(user.is_none());

    cleanup(app).await;
}

#[tokio::test]
async fn unknown_org_is_rejected_on_create_and_update() {
    let app = spawn_app().await;
    let (_, token) = app.bootstrap_admin().await;
    let role_id = app.seed_role("Editor", &[]).await;

    let resp = app
        .post_form(
            "/admin/users",
            &token,
            &[
                ("name", "Nina"),
                ("username", "nina"),
                ("email", "nina@example.com"),
                ("password", "super-secret-pw"),
                ("org_id", "999999"),
                ("role_id", &role_id.to_string()),
            ],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(db::users::find_by_username(&app.pool, "nina")
        .await
        .unwrap()
        .is_none());

    let user = app.seed_user("Olga", "olga", None, None).await;
    let resp = app
        .put_form(
            &format!("/admin/users/{}", user.id),
            &token,
            &[("org_id", "999999")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let unchanged = db::users::find_by_id(&app.pool, user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.org_id, None);

    cleanup(app).await;
}

#[tokio::test]
async fn create_validates_required_fields() {
    let app = spawn_app().await;
    let (_, token) = app.bootstrap_admin().await;
    let role_id = app.seed_role("Editor", &[]).await;

    let resp = app
        .post_form(
            "/admin/users",
            &token,
            &[
                ("name", ""),
                ("username", "short"),
                ("email", "not-an-email"),
                ("password", "short"),
                ("role_id", &role_id.to_string()),
            ],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: serde_json::Value = resp.json().await.unwrap();
    let fields: Vec<_> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap().to_string())
        .collect();
    assert!(fields.contains(&"name".to_string()));
    assert!(fields.contains(&"email".to_string()));
    assert!(fields.contains(&"password".to_string()));

    cleanup(app).await;
}

#[tokio::test]
async fn create_rejects_duplicate_username() {
    let app = spawn_app().await;
    let (_, token) = app.bootstrap_admin().await;
    let role_id = app.seed_role("Editor", &[]).await;
    app.seed_user("Alice", "alice", None, None).await;

    let resp = app
        .post_form(
            "/admin/users",
            &token,
            &[
                ("name", "Alice Two"),
                ("username", "alice"),
                ("email", "alice2@example.com"),
                ("password", "super-secret-pw"),
                ("role_id", &role_id.to_string()),
            ],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    cleanup(app).await;
}

#[tokio::test]
async fn update_writes_only_supplied_fields() {
    let app = spawn_app().await;
    let (admin, token) = app.bootstrap_admin().await;
    let user = app.seed_user("Grace", "grace", None, None).await;

    let resp = app
        .put_form(
            &format!("/admin/users/{}", user.id),
            &token,
            &[("email", "grace@new.example.com")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let updated = db::users::find_by_id(&app.pool, user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.email, "grace@new.example.com");
    assert_eq!(updated.name, "Grace");
    assert_eq!(updated.username, "grace");
    assert_eq!(updated.updatedby_userid, Some(admin.id));

    cleanup(app).await;
}

#[tokio::test]
async fn update_can_reassign_the_role() {
    let app = spawn_app().await;
    let (_, token) = app.bootstrap_admin().await;
    let editor = app.seed_role("Editor", &[]).await;
    let auditor = app.seed_role("Auditor", &[]).await;
    let user = app.seed_user("Heidi", "heidi", None, Some(editor)).await;

    let resp = app
        .put_form(
            &format!("/admin/users/{}", user.id),
            &token,
            &[("role_id", &auditor.to_string())],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let role = db::roles::role_for_user(&app.pool, user.id)
        .await
        .unwrap()
        .expect("role membership missing");
    assert_eq!(role.name, "Auditor");

    cleanup(app).await;
}

#[tokio::test]
async fn update_unknown_user_is_not_found() {
    let app = spawn_app().await;
    let (_, token) = app.bootstrap_admin().await;

    let resp = app
        .put_form("/admin/users/999999", &token, &[("name", "Nobody")])
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    cleanup(app).await;
}

#[tokio::test]
async fn destroy_soft_deletes_and_hides_the_user() {
    let app = spawn_app().await;
    let (admin, token) = app.bootstrap_admin().await;
    let user = app.seed_user("Ivan", "ivan", None, None).await;

    let resp = app
        .delete_auth(&format!("/admin/users/{}", user.id), &token)
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let deleted = db::users::find_by_id(&app.pool, user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(deleted.status, Status::Inactive);
    assert_eq!(deleted.updatedby_userid, Some(admin.id));

    let page = db::users::list(&app.pool, None, Pager::new(25), 1)
        .await
        .unwrap();
    assert!(page.items.iter().all(|u| u.id != user.id));

    // A second delete finds nothing active to update.
    let resp = app
        .delete_auth(&format!("/admin/users/{}", user.id), &token)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    cleanup(app).await;
}

#[tokio::test]
async fn destroy_without_capability_leaves_the_record_untouched() {
    let app = spawn_app().await;
    app.bootstrap_admin().await;
    let role_id = app.seed_role("Viewer", &["read-user", "show-user"]).await;
    app.seed_user("Viewer", "viewer", None, Some(role_id)).await;
    let target = app.seed_user("Target", "target", None, None).await;
    let token = app.token_for("viewer").await;

    let resp = app
        .delete_auth(&format!("/admin/users/{}", target.id), &token)
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], json!("403 Forbidden"));

    let unchanged = db::users::find_by_id(&app.pool, target.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.status, Status::Active);

    cleanup(app).await;
}

#[tokio::test]
async fn mass_destroy_marks_rows_removed_and_returns_no_content() {
    let app = spawn_app().await;
    let (admin, token) = app.bootstrap_admin().await;
    let a = app.seed_user("Judy", "judy", None, None).await;
    let b = app.seed_user("Ken", "ken", None, None).await;
    let untouched = app.seed_user("Liam", "liam", None, None).await;

    let resp = app
        .delete_json("/api/v1/users", &token, &json!({ "ids": [a.id, b.id] }))
        .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(resp.text().await.unwrap().is_empty());

    for id in [a.id, b.id] {
        let user = db::users::find_by_id(&app.pool, id).await.unwrap().unwrap();
        assert_eq!(user.status, Status::Removed);
        assert_eq!(user.updatedby_userid, Some(admin.id));
    }
    let user = db::users::find_by_id(&app.pool, untouched.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.status, Status::Active);

    cleanup(app).await;
}

#[tokio::test]
async fn mass_destroy_rejects_an_empty_id_list() {
    let app = spawn_app().await;
    let (_, token) = app.bootstrap_admin().await;

    let resp = app
        .delete_json("/api/v1/users", &token, &json!({ "ids": [] }))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    cleanup(app).await;
}

#[tokio::test]
async fn show_page_renders_the_user_details() {
    let app = spawn_app().await;
    let (_, token) = app.bootstrap_admin().await;
    let org = db::orgs::create(&app.pool, "Acme").await.unwrap();
    let user = app.seed_user("Mallory", "mallory", Some(org.id), None).await;

    let resp = app
        .get_auth(&format!("/admin/users/{}", user.id), &token)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Mallory"));
    assert!(body.contains("Acme"));

    let resp = app.get_auth("/admin/users/999999", &token).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    cleanup(app).await;
}
