mod common;

use axum::http::StatusCode;
use common::test_app;
use mentorship_portal::repository::Repository;

// --- Departments ---

#[tokio::test]
async fn test_admin_adds_department() {
    let app = test_app();
    let admin = app.seed_admin().await;
    let mut client = app.client_as(admin.id);

    let response = client
        .post("/admin/departments/add", "name=IT&description=The+IT+Department")
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), "/admin/departments");

    let departments = app.repo.list_departments().await.unwrap();
    assert_eq!(departments.len(), 1);
    assert_eq!(departments[0].name, "IT");
    assert_eq!(departments[0].description, "The IT Department");

    let list = client.get("/admin/departments").await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.template(), "admin/departments/departments.html");
    assert_eq!(list.context()["departments"][0]["name"], "IT");
    assert_eq!(
        list.notices(),
        vec!["You have successfully added a new department."]
    );
}

#[tokio::test]
async fn test_notices_are_shown_once() {
    let app = test_app();
    let admin = app.seed_admin().await;
    let mut client = app.client_as(admin.id);

    client
        .post("/admin/departments/add", "name=IT&description=The+IT+Department")
        .await;
    let first = client.get("/admin/departments").await;
    assert_eq!(first.notices().len(), 1);

    let second = client.get("/admin/departments").await;
    assert!(second.notices().is_empty());
}

#[tokio::test]
async fn test_add_department_form_renders_empty() {
    let app = test_app();
    let admin = app.seed_admin().await;
    let mut client = app.client_as(admin.id);

    let response = client.get("/admin/departments/add").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.template(), "admin/departments/department.html");
    assert_eq!(response.body["title"], "Add Department");
    assert_eq!(response.context()["add_department"], true);
    assert_eq!(response.context()["form"]["name"], "");
    assert!(response.context()["department"].is_null());
}

#[tokio::test]
async fn test_duplicate_department_is_reported_as_notice() {
    let app = test_app();
    let admin = app.seed_admin().await;
    app.seed_department("IT").await;
    let mut client = app.client_as(admin.id);

    let response = client
        .post("/admin/departments/add", "name=IT&description=Another")
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(app.repo.list_departments().await.unwrap().len(), 1);

    let list = client.get("/admin/departments").await;
    assert_eq!(list.notices(), vec!["Error: department name already exists."]);
}

#[tokio::test]
async fn test_add_department_requires_both_fields() {
    let app = test_app();
    let admin = app.seed_admin().await;
    let mut client = app.client_as(admin.id);

    let response = client
        .post("/admin/departments/add", "name=+++&description=Kept")
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.template(), "admin/departments/department.html");
    assert_eq!(
        response.context()["form"]["errors"]["name"][0],
        "This field is required."
    );
    assert!(response.context()["form"]["errors"]["description"].is_null());
    // Submitted values are echoed back.
    assert_eq!(response.context()["form"]["description"], "Kept");
    assert!(app.repo.list_departments().await.unwrap().is_empty());

    let missing = client.post("/admin/departments/add", "").await;
    assert_eq!(missing.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(missing.context()["form"]["errors"]["description"].is_array());
}

#[tokio::test]
async fn test_edit_department() {
    let app = test_app();
    let admin = app.seed_admin().await;
    let department = app.seed_department("IT").await;
    let mut client = app.client_as(admin.id);
    let uri = format!("/admin/departments/edit/{}", department.id);

    let form = client.get(&uri).await;
    assert_eq!(form.status, StatusCode::OK);
    assert_eq!(form.body["title"], "Edit Department");
    assert_eq!(form.context()["add_department"], false);
    assert_eq!(form.context()["form"]["name"], "IT");
    assert_eq!(form.context()["form"]["description"], "The IT Department");

    let response = client
        .post(&uri, "name=Engineering&description=Builds+things")
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), "/admin/departments");

    let updated = app.repo.get_department(department.id).await.unwrap().unwrap();
    assert_eq!(updated.name, "Engineering");
    assert_eq!(updated.description, "Builds things");
    assert_eq!(app.repo.list_departments().await.unwrap().len(), 1);

    let list = client.get("/admin/departments").await;
    assert_eq!(list.notices(), vec!["You have successfully edited the department."]);
}

#[tokio::test]
async fn test_edit_department_to_duplicate_name_fails() {
    let app = test_app();
    let admin = app.seed_admin().await;
    app.seed_department("IT").await;
    let sales = app.seed_department("Sales").await;
    let mut client = app.client_as(admin.id);

    let response = client
        .post(
            &format!("/admin/departments/edit/{}", sales.id),
            "name=IT&description=Clash",
        )
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.context()["heading"], "500 Error");

    let unchanged = app.repo.get_department(sales.id).await.unwrap().unwrap();
    assert_eq!(unchanged.name, "Sales");
}

#[tokio::test]
async fn test_delete_department() {
    let app = test_app();
    let admin = app.seed_admin().await;
    let department = app.seed_department("IT").await;
    let mut client = app.client_as(admin.id);

    let response = client
        .get(&format!("/admin/departments/delete/{}", department.id))
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), "/admin/departments");
    assert!(app.repo.list_departments().await.unwrap().is_empty());

    let list = client.get("/admin/departments").await;
    assert_eq!(list.notices(), vec!["You have successfully deleted the department."]);
}

#[tokio::test]
async fn test_delete_department_unassigns_mentees() {
    let app = test_app();
    let admin = app.seed_admin().await;
    let mentee = app.seed_mentee("jane", false).await;
    let department = app.seed_department("IT").await;
    let mentor = app.seed_mentor("CEO").await;
    let mut client = app.client_as(admin.id);

    client
        .post(
            &format!("/admin/mentees/assign/{}", mentee.id),
            &format!("department={}&mentor={}", department.id, mentor.id),
        )
        .await;

    client
        .post(&format!("/admin/departments/delete/{}", department.id), "")
        .await;

    let mentee = app.repo.get_mentee(mentee.id).await.unwrap().unwrap();
    assert_eq!(mentee.department_id, None);
    assert_eq!(mentee.mentor_id, Some(mentor.id));
}

// --- Mentors ---

#[tokio::test]
async fn test_duplicate_mentor_is_rejected() {
    let app = test_app();
    let admin = app.seed_admin().await;
    let mut client = app.client_as(admin.id);
    let form = "name=CEO&description=Run+the+whole+company";

    let first = client.post("/admin/mentors/add", form).await;
    assert_eq!(first.status, StatusCode::SEE_OTHER);
    let second = client.post("/admin/mentors/add", form).await;
    assert_eq!(second.status, StatusCode::SEE_OTHER);
    assert_eq!(second.location(), "/admin/mentors");

    let mentors = app.repo.list_mentors().await.unwrap();
    assert_eq!(mentors.len(), 1);
    assert_eq!(mentors[0].name, "CEO");

    let list = client.get("/admin/mentors").await;
    let notices = list.notices();
    assert_eq!(notices.len(), 2);
    assert_eq!(notices[0], "You have successfully added a new mentor.");
    assert!(notices[1].contains("already exists"));
}

#[tokio::test]
async fn test_edit_and_delete_mentor() {
    let app = test_app();
    let admin = app.seed_admin().await;
    let mentor = app.seed_mentor("CEO").await;
    let mut client = app.client_as(admin.id);

    let response = client
        .post(
            &format!("/admin/mentors/edit/{}", mentor.id),
            "name=CTO&description=Runs+the+tech",
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(
        app.repo.get_mentor(mentor.id).await.unwrap().unwrap().name,
        "CTO"
    );

    let response = client
        .post(&format!("/admin/mentors/delete/{}", mentor.id), "")
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert!(app.repo.list_mentors().await.unwrap().is_empty());

    let list = client.get("/admin/mentors").await;
    assert_eq!(
        list.notices(),
        vec![
            "You have successfully edited the mentor.",
            "You have successfully deleted the mentor.",
        ]
    );
}

#[tokio::test]
async fn test_mentor_list_is_get_only() {
    let app = test_app();
    let admin = app.seed_admin().await;
    let mut client = app.client_as(admin.id);

    let response = client.post("/admin/mentors", "").await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
}

// --- Missing records ---

#[tokio::test]
async fn test_missing_ids_are_not_found() {
    let app = test_app();
    let admin = app.seed_admin().await;
    app.seed_department("IT").await;
    app.seed_mentor("CEO").await;
    let mut client = app.client_as(admin.id);

    for uri in [
        "/admin/departments/edit/99",
        "/admin/departments/delete/99",
        "/admin/mentors/edit/99",
        "/admin/mentors/delete/99",
        "/admin/mentees/assign/99",
    ] {
        let response = client.post(uri, "name=X&description=Y&department=1&mentor=1").await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(response.context()["heading"], "404 Error");
    }

    assert_eq!(app.repo.list_departments().await.unwrap()[0].name, "IT");
    assert_eq!(app.repo.list_mentors().await.unwrap()[0].name, "CEO");
}

#[tokio::test]
async fn test_non_numeric_id_is_not_found() {
    let app = test_app();
    let admin = app.seed_admin().await;
    app.seed_department("IT").await;
    app.seed_mentor("CEO").await;
    let mut client = app.client_as(admin.id);

    for uri in [
        "/admin/departments/edit/abc",
        "/admin/departments/delete/abc",
        "/admin/mentors/edit/abc",
        "/admin/mentors/delete/1x",
        "/admin/mentees/assign/abc",
    ] {
        let response = client.get(uri).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(response.context()["heading"], "404 Error");

        let response = client.post(uri, "name=X&description=Y&department=1&mentor=1").await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{uri}");
    }

    assert_eq!(app.repo.list_departments().await.unwrap()[0].name, "IT");
    assert_eq!(app.repo.list_mentors().await.unwrap().len(), 1);
}

// --- Mentees ---

#[tokio::test]
async fn test_assign_mentee() {
    let app = test_app();
    let admin = app.seed_admin().await;
    let mentee = app.seed_mentee("jane", false).await;
    let department = app.seed_department("IT").await;
    let mentor = app.seed_mentor("CEO").await;
    let mut client = app.client_as(admin.id);
    let uri = format!("/admin/mentees/assign/{}", mentee.id);

    let form = client.get(&uri).await;
    assert_eq!(form.status, StatusCode::OK);
    assert_eq!(form.template(), "admin/mentees/mentee.html");
    assert_eq!(form.context()["form"]["department_choices"][0]["label"], "IT");
    assert_eq!(form.context()["form"]["mentor_choices"][0]["label"], "CEO");
    assert!(form.context()["form"]["department"].is_null());

    let response = client
        .post(&uri, &format!("department={}&mentor={}", department.id, mentor.id))
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), "/admin/mentees");

    let stored = app.repo.get_mentee(mentee.id).await.unwrap().unwrap();
    assert_eq!(stored.department_id, Some(department.id));
    assert_eq!(stored.mentor_id, Some(mentor.id));

    let list = client.get("/admin/mentees").await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(
        list.notices(),
        vec!["You have successfully assigned a department and mentor."]
    );
    let listed = list.context()["mentees"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["id"] == mentee.id)
        .unwrap()
        .clone();
    assert_eq!(listed["department_name"], "IT");
    assert_eq!(listed["mentor_name"], "CEO");

    // The form now shows the current assignment.
    let form = client.get(&uri).await;
    assert_eq!(form.context()["form"]["department"], department.id);
    assert_eq!(form.context()["form"]["mentor"], mentor.id);
}

#[tokio::test]
async fn test_assign_mentee_twice_is_idempotent() {
    let app = test_app();
    let admin = app.seed_admin().await;
    let mentee = app.seed_mentee("jane", false).await;
    let department = app.seed_department("IT").await;
    let mentor = app.seed_mentor("CEO").await;
    let mut client = app.client_as(admin.id);
    let uri = format!("/admin/mentees/assign/{}", mentee.id);
    let form = format!("department={}&mentor={}", department.id, mentor.id);

    client.post(&uri, &form).await;
    let once = app.repo.get_mentee(mentee.id).await.unwrap().unwrap();
    client.post(&uri, &form).await;
    let twice = app.repo.get_mentee(mentee.id).await.unwrap().unwrap();

    assert_eq!(once, twice);
    assert_eq!(app.repo.list_mentees().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_assign_rejects_unknown_choices() {
    let app = test_app();
    let admin = app.seed_admin().await;
    let mentee = app.seed_mentee("jane", false).await;
    let department = app.seed_department("IT").await;
    let mut client = app.client_as(admin.id);

    let response = client
        .post(
            &format!("/admin/mentees/assign/{}", mentee.id),
            &format!("department={}&mentor=42", department.id),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.context()["form"]["errors"]["mentor"][0], "Not a valid choice");
    assert!(response.context()["form"]["errors"]["department"].is_null());

    let stored = app.repo.get_mentee(mentee.id).await.unwrap().unwrap();
    assert_eq!(stored.department_id, None);
}

#[tokio::test]
async fn test_admin_mentee_cannot_be_assigned() {
    let app = test_app();
    let admin = app.seed_admin().await;
    let other_admin = app.seed_mentee("root", true).await;
    let department = app.seed_department("IT").await;
    let mentor = app.seed_mentor("CEO").await;
    let mut client = app.client_as(admin.id);

    let response = client
        .post(
            &format!("/admin/mentees/assign/{}", other_admin.id),
            &format!("department={}&mentor={}", department.id, mentor.id),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let stored = app.repo.get_mentee(other_admin.id).await.unwrap().unwrap();
    assert_eq!(stored.department_id, None);
    assert_eq!(stored.mentor_id, None);
}

// --- Guard ---

#[tokio::test]
async fn test_non_admin_cannot_list_mentors() {
    let app = test_app();
    let mentee = app.seed_mentee("jane", false).await;
    app.seed_mentor("CEO").await;
    let mut client = app.client_as(mentee.id);

    let response = client.get("/admin/mentors").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.template(), "errors/403.html");
    assert_eq!(response.context()["heading"], "403 Error");
    assert_eq!(app.repo.list_mentors().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_non_admin_is_forbidden_everywhere() {
    let app = test_app();
    let mentee = app.seed_mentee("jane", false).await;
    let department = app.seed_department("IT").await;
    let mentor = app.seed_mentor("CEO").await;
    let mut client = app.client_as(mentee.id);
    let form = format!(
        "name=Hacked&description=Hacked&department={}&mentor={}",
        department.id, mentor.id
    );

    let uris = [
        "/admin/dashboard".to_string(),
        "/admin/departments".to_string(),
        "/admin/departments/add".to_string(),
        format!("/admin/departments/edit/{}", department.id),
        format!("/admin/departments/delete/{}", department.id),
        "/admin/mentors/add".to_string(),
        format!("/admin/mentors/edit/{}", mentor.id),
        format!("/admin/mentors/delete/{}", mentor.id),
        format!("/admin/mentees/assign/{}", mentee.id),
    ];
    for uri in &uris {
        let response = client.post(uri, &form).await;
        // The dashboard is GET only; every other route is reached and refused.
        if uri != "/admin/dashboard" {
            assert_eq!(response.status, StatusCode::FORBIDDEN, "{uri}");
        }
        let response = client.get(uri).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{uri}");
    }
    let response = client.get("/admin/mentees").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let departments = app.repo.list_departments().await.unwrap();
    assert_eq!(departments.len(), 1);
    assert_eq!(departments[0].name, "IT");
    let mentors = app.repo.list_mentors().await.unwrap();
    assert_eq!(mentors.len(), 1);
    assert_eq!(mentors[0].name, "CEO");
    assert_eq!(
        app.repo.get_mentee(mentee.id).await.unwrap().unwrap().department_id,
        None
    );
}

#[tokio::test]
async fn test_admin_dashboard() {
    let app = test_app();
    let admin = app.seed_admin().await;
    let mut client = app.client_as(admin.id);

    let response = client.get("/admin/dashboard").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.template(), "home/admin_dashboard.html");
    assert_eq!(response.context()["principal"]["username"], "admin");
    assert_eq!(response.context()["principal"]["is_admin"], true);
}
