//! End-to-end flow over the HTTP layer with a temporary storage root.

use std::io::Write;

use actix_web::{test, web, App};
use backend::config::Config;
use backend::llm::LlmHandle;
use backend::resume::{ResumeRepository, ResumeRepositoryImpl};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use shared::{ResumeSections, ResumeState, Role};
use tempfile::TempDir;

const MASTER: &str = "Jane Doe\n\
    PROFESSIONAL SUMMARY\n\
    Data engineer building reliable pipelines.\n\
    TECHNICAL SKILLS\n\
    SQL, Python, Airflow\n\
    PROFESSIONAL EXPERIENCE\n\
    Acme Corp | Jan 2020 - Present | Data Engineer\n\
    - Built Airflow pipelines loading Snowflake with SQL\n\
    - Wrote Kafka consumers for streaming ingestion\n\
    Globex | Jan 2017 - Dec 2019 | Analyst\n\
    - Automated SQL reporting for finance teams\n\
    EDUCATION\n\
    BSc Computer Science\n";

const JD: &str = "Senior Data Engineer\nMust have: Airflow, Snowflake, SQL\nBuild batch pipelines";

const KAFKA_JD: &str = "Requirements:\nSQL, Python, Kafka";

macro_rules! app {
    ($dir:expr) => {{
        let config = Config::for_storage($dir.path());
        config.storage.ensure_dirs().unwrap();
        let repo = ResumeRepositoryImpl::new(config.storage.generated_resumes_dir.clone());
        test::init_service(
            App::new()
                .app_data(web::Data::new(config))
                .app_data(web::Data::new(repo))
                .app_data(web::Data::new(LlmHandle::default()))
                .configure(backend::routes::configure_routes),
        )
        .await
    }};
}

#[actix_web::test]
async fn test_health_reports_missing_index() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["index_ready"], false);
}

#[actix_web::test]
async fn test_generate_without_index_is_bad_request() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);

    let req = test::TestRequest::post()
        .uri("/generate")
        .set_json(json!({"jd_text": JD}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn test_upload_rejects_unsupported_files() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);

    let req = test::TestRequest::post()
        .uri("/upload-resumes")
        .set_json(json!({"files": [{"filename": "resume.rtf", "content_base64": STANDARD.encode("x")}]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
    assert!(std::fs::read_dir(dir.path().join("resumes")).unwrap().next().is_none());
}

#[actix_web::test]
async fn test_upload_generate_edit_and_score() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);

    let req = test::TestRequest::post()
        .uri("/upload-resumes")
        .set_json(json!({"files": [{"filename": "master.txt", "content_base64": STANDARD.encode(MASTER)}]}))
        .to_request();
    let ingest: Value = test::call_and_read_body_json(&app, req).await;
    assert!(ingest["indexed_chunks"].as_u64().unwrap() > 0);
    assert_eq!(ingest["saved_files"], json!(["master.txt"]));

    let req = test::TestRequest::post()
        .uri("/generate")
        .set_json(json!({"jd_text": JD, "audit": true, "bullets_per_role": 5}))
        .to_request();
    let generated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(generated["version"], "v1");
    assert_eq!(generated["audit"]["master_resume"], "master.txt");
    let resume_id = generated["resume_id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/resumes/{}", resume_id))
        .to_request();
    let stored: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stored["state"]["sections"]["experience"][0]["company"], "Acme Corp");

    let req = test::TestRequest::patch()
        .uri(&format!("/resumes/{}/bullet", resume_id))
        .set_json(json!({
            "role_selector": {"company": "acme corp", "dates": "Jan 2020 - Present"},
            "bullet_index": 0,
            "new_bullet": "- Built Airflow DAGs loading Snowflake marts"
        }))
        .to_request();
    let edited: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(edited["version"], "v2");
    assert_eq!(edited["updated_role"]["role_id"], "role_1");

    let req = test::TestRequest::patch()
        .uri(&format!("/resumes/{}/bullet", resume_id))
        .set_json(json!({"role_selector": {}, "bullet_index": 0, "new_bullet": "- Built Airflow DAGs"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 422);

    let req = test::TestRequest::post()
        .uri("/ats-score")
        .set_json(json!({"jd_text": JD, "resume_id": resume_id}))
        .to_request();
    let report: Value = test::call_and_read_body_json(&app, req).await;
    let score = report["ats_score"].as_i64().unwrap();
    assert!((0..=100).contains(&score));
}

#[actix_web::test]
async fn test_unknown_resume_is_not_found() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);

    let req = test::TestRequest::get().uri("/resumes/missing").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "resume_id not found");
}

fn role(id: &str, company: &str, bullet: &str) -> Role {
    Role {
        role_id: id.to_string(),
        company: company.to_string(),
        title: Some("Data Engineer".to_string()),
        dates: Some("2020 - Present".to_string()),
        bullets: vec![bullet.to_string()],
        ..Default::default()
    }
}

/// Stores a resume with SQL and Python evidence but nothing about Kafka.
async fn seed_resume(dir: &TempDir) -> String {
    let config = Config::for_storage(dir.path());
    let repo = ResumeRepositoryImpl::new(config.storage.generated_resumes_dir.clone());
    let state = ResumeState {
        sections: ResumeSections {
            professional_summary: "Data engineer.".to_string(),
            technical_skills: vec!["SQL, Python".to_string()],
            experience: vec![
                role("role_1", "Acme Corp", "Built SQL reports for finance teams"),
                role("role_2", "Globex", "Automated Python jobs for ingestion"),
            ],
            education: vec![],
        },
    };
    repo.create_resume(&state).await.unwrap().resume_id
}

fn kafka_experience_patch() -> Value {
    json!({
        "role_id": "role_1",
        "section": "experience",
        "action": "insert",
        "new_bullet": "Streamed order events with Kafka"
    })
}

#[actix_web::test]
async fn test_suggest_patches_per_truth_mode() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);
    let resume_id = seed_resume(&dir).await;
    let uri = format!("/resumes/{}/suggest-patches", resume_id);

    let req = test::TestRequest::post()
        .uri(&uri)
        .set_json(json!({"jd_text": KAFKA_JD, "truth_mode": "balanced"}))
        .to_request();
    let balanced: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(balanced["suggested_patches"].as_array().unwrap().len(), 1);
    assert_eq!(balanced["suggested_patches"][0]["section"], "technical_skills");
    assert_eq!(balanced["suggested_patches"][0]["new_bullet"], "Exposure to Kafka");
    assert_eq!(balanced["suggested_patches"][0]["after_index"], 0);
    assert_eq!(balanced["blocked"], json!([]));

    let req = test::TestRequest::post()
        .uri(&uri)
        .set_json(json!({"jd_text": KAFKA_JD, "truth_mode": "strict"}))
        .to_request();
    let strict: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(strict["suggested_patches"], json!([]));
    assert_eq!(strict["blocked"][0]["skill"], "Kafka");
    assert_eq!(strict["blocked"][0]["recommended_action"], "downgrade_to_exposure");

    let req = test::TestRequest::post()
        .uri("/resumes/missing/suggest-patches")
        .set_json(json!({"jd_text": KAFKA_JD}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
}

#[actix_web::test]
async fn test_blocked_plan_lists_strict_blocks() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);
    let resume_id = seed_resume(&dir).await;
    let uri = format!("/resumes/{}/blocked-plan", resume_id);

    let req = test::TestRequest::post()
        .uri(&uri)
        .set_json(json!({"jd_text": KAFKA_JD, "truth_mode": "strict", "top_n": 5}))
        .to_request();
    let plan: Value = test::call_and_read_body_json(&app, req).await;
    let blocked = plan["blocked"].as_array().unwrap();
    assert_eq!(blocked.len(), 1);
    assert_eq!(blocked[0]["skill"], "Kafka");
    assert!(blocked[0]["reason"].as_str().unwrap().contains("strict mode"));

    let req = test::TestRequest::post()
        .uri(&uri)
        .set_json(json!({"jd_text": KAFKA_JD, "truth_mode": "off"}))
        .to_request();
    let plan: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(plan["blocked"], json!([]));
}

#[actix_web::test]
async fn test_apply_patches_enforces_truth_mode() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);
    let resume_id = seed_resume(&dir).await;
    let uri = format!("/resumes/{}/apply-patches", resume_id);

    for mode in ["balanced", "strict"] {
        let req = test::TestRequest::post()
            .uri(&uri)
            .set_json(json!({"patches": [kafka_experience_patch()], "truth_mode": mode}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 422, "truth mode {}", mode);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["message"].as_str().unwrap().ends_with("for skill: Kafka"));
    }

    let req = test::TestRequest::post()
        .uri(&uri)
        .set_json(json!({
            "patches": [{"role_id": "role_9", "section": "experience", "new_bullet": "Tuned SQL queries"}],
            "truth_mode": "off"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 422);

    let req = test::TestRequest::post()
        .uri(&uri)
        .set_json(json!({"patches": [kafka_experience_patch()], "truth_mode": "off"}))
        .to_request();
    let applied: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(applied["resume_id"], resume_id.as_str());
    assert_eq!(applied["version"], "v2");
    assert!(applied["paths"]["resume_json"].as_str().unwrap().ends_with("v2/resume.json"));
    assert_eq!(applied["paths"]["resume_docx"], Value::Null);

    let req = test::TestRequest::get()
        .uri(&format!("/resumes/{}", resume_id))
        .to_request();
    let stored: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        stored["state"]["sections"]["experience"][0]["bullets"],
        json!(["Built SQL reports for finance teams", "Streamed order events with Kafka"])
    );
}

#[actix_web::test]
async fn test_overrides_from_blocked_merge_and_unlock_patches() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);
    let resume_id = seed_resume(&dir).await;
    let uri = format!("/resumes/{}/overrides/from-blocked", resume_id);

    let req = test::TestRequest::post()
        .uri(&uri)
        .set_json(json!({"items": [{
            "skill": "Kafka",
            "level": "hands_on",
            "role_id": "role_1",
            "proof_bullet": "- Streamed order events with Kafka"
        }]}))
        .to_request();
    let first: Value = test::call_and_read_body_json(&app, req).await;
    assert!(first["overrides_path"].as_str().unwrap().ends_with("overrides.json"));
    assert_eq!(first["overrides"]["skills"][0]["level"], "hands_on");
    assert_eq!(first["overrides"]["skills"][0]["proof_bullets"], json!(["Streamed order events with Kafka"]));

    let items: Vec<Value> = [
        "Built Kafka consumers for ingestion",
        "Tuned Kafka partitions for throughput",
        "Monitored Kafka lag with alerts",
    ]
    .iter()
    .map(|bullet| json!({"skill": "kafka", "level": "worked_with", "role_id": "role_2", "proof_bullet": bullet}))
    .collect();
    let req = test::TestRequest::post()
        .uri(&uri)
        .set_json(json!({"items": items}))
        .to_request();
    let merged: Value = test::call_and_read_body_json(&app, req).await;
    let skills = merged["overrides"]["skills"].as_array().unwrap();
    assert_eq!(skills.len(), 1);
    assert_eq!(skills[0]["skill"], "Kafka");
    assert_eq!(skills[0]["level"], "worked_with");
    assert_eq!(skills[0]["target_roles"], json!(["role_1", "role_2"]));
    assert_eq!(
        skills[0]["proof_bullets"],
        json!([
            "Streamed order events with Kafka",
            "Built Kafka consumers for ingestion",
            "Tuned Kafka partitions for throughput"
        ])
    );

    for item in [
        json!({"skill": "Kafka", "role_id": "role_9", "proof_bullet": "Streamed events"}),
        json!({"skill": "Kafka", "role_id": "role_1", "proof_bullet": "- ok"}),
    ] {
        let req = test::TestRequest::post()
            .uri(&uri)
            .set_json(json!({"items": [item]}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 422);
    }

    // the override now backs the experience insert in balanced mode
    let req = test::TestRequest::post()
        .uri(&format!("/resumes/{}/apply-patches", resume_id))
        .set_json(json!({"patches": [kafka_experience_patch()], "truth_mode": "balanced"}))
        .to_request();
    let applied: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(applied["version"], "v2");
}

#[actix_web::test]
async fn test_save_overrides_unknown_resume_is_not_found() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);

    let req = test::TestRequest::post()
        .uri("/resumes/missing/overrides")
        .set_json(json!({"skills": []}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "resume_id not found");
}

fn write_template(path: &std::path::Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut writer = zip::ZipWriter::new(std::fs::File::create(path).unwrap());
    let options = zip::write::FileOptions::default();
    writer.start_file("[Content_Types].xml", options).unwrap();
    writer.write_all(b"<Types/>").unwrap();
    writer.start_file("word/document.xml", options).unwrap();
    writer.write_all(b"<old/>").unwrap();
    writer.finish().unwrap();
}

#[actix_web::test]
async fn test_export_docx_requires_template_then_writes_folder() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);
    let resume_id = seed_resume(&dir).await;
    let payload = json!({
        "resume_id": resume_id,
        "company_name": "Acme Corp",
        "position_name": "Data Engineer",
        "job_id": "R-42",
        "jd_text": KAFKA_JD
    });

    let req = test::TestRequest::post()
        .uri("/export-docx")
        .set_json(payload.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["message"],
        "DOCX template not found. Put template at storage/resumes/template/template.docx"
    );

    write_template(&Config::for_storage(dir.path()).storage.docx_template_path);
    let req = test::TestRequest::post()
        .uri("/export-docx")
        .set_json(payload)
        .to_request();
    let exported: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(exported["version"], "v1");
    assert!(exported["folder"].as_str().unwrap().ends_with("exports/Acme_Corp_Data_Engineer_R-42"));

    let folder = dir.path().join("exports").join("Acme_Corp_Data_Engineer_R-42");
    assert!(folder.join("resume.docx").is_file());
    assert_eq!(std::fs::read_to_string(folder.join("job_description.txt")).unwrap(), KAFKA_JD);
    assert!(exported["paths"]["job_description"].as_str().unwrap().ends_with("job_description.txt"));
}

#[actix_web::test]
async fn test_corrupt_stored_resume_is_server_error() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);
    let resume_id = seed_resume(&dir).await;
    let meta = dir.path().join("generated_resumes").join(&resume_id).join("meta.json");
    std::fs::write(meta, "{truncated").unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/resumes/{}", resume_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 500);
}
