use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::info;
use serde_json::{json, Value};
use shared::{
    AtsScoreResponse, BlockedPlanResponse, BulletEditResponse, ExportDocxResponse, GenerateResponse,
    IngestResponse, JdParseResponse, OverridesFromBlockedResponse, PatchOperation, ResumeStateResponse,
    SkillCoverage, SkillLevel, SuggestPatchesResponse, TruthMode, UploadFile,
};

use crate::api_client::ApiClient;
use crate::cli::Command;
use crate::session::Session;
use crate::utils::{evidence_summary, extract_resume_text, role_options};

pub const MIN_BULLET_CHARS: usize = 10;

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn upload_file(path: &Path) -> Result<UploadFile> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .context("upload path has no file name")?;
    Ok(UploadFile {
        filename,
        content_base64: STANDARD.encode(bytes),
    })
}

/// Patches picked by index; no indices means all of them.
pub fn select_patches(patches: &[PatchOperation], indices: &[usize]) -> Result<Vec<PatchOperation>> {
    if indices.is_empty() {
        return Ok(patches.to_vec());
    }
    indices
        .iter()
        .map(|&i| {
            patches
                .get(i)
                .cloned()
                .with_context(|| format!("patch index {} out of range (have {})", i, patches.len()))
        })
        .collect()
}

/// Trimmed bullet when it is long enough to send.
pub fn checked_bullet(text: &str) -> Result<&str> {
    let text = text.trim();
    if text.chars().count() < MIN_BULLET_CHARS {
        bail!("Bullet too short (min {} chars)", MIN_BULLET_CHARS);
    }
    Ok(text)
}

fn patch_label(patch: &PatchOperation) -> String {
    let target = patch.role_id.as_deref().filter(|r| !r.is_empty()).unwrap_or("skills");
    format!(
        "{} | {} | {}",
        serde_json::to_value(patch.action).unwrap_or_default().as_str().unwrap_or(""),
        serde_json::to_value(patch.section).unwrap_or_default().as_str().unwrap_or(""),
        target
    )
}

fn print_coverage(title: &str, rows: &[SkillCoverage]) {
    println!("{}", title);
    for row in rows {
        let status = serde_json::to_value(row.status).unwrap_or_default();
        println!("  {:<24} {:<8} {}", row.skill, status.as_str().unwrap_or(""), evidence_summary(row));
    }
}

async fn load_state(client: &ApiClient, resume_id: &str) -> Result<ResumeStateResponse> {
    client
        .get_as::<ResumeStateResponse>(&format!("/resumes/{}", resume_id))
        .await
        .into_result()
}

async fn print_latest(client: &ApiClient, resume_id: &str) -> Result<()> {
    let loaded = load_state(client, resume_id).await?;
    println!("{}", extract_resume_text(Some(&loaded.state)));
    Ok(())
}

/// Runs one command, reading and updating the session.
pub async fn run(client: &ApiClient, session: &mut Session, command: Command) -> Result<()> {
    match command {
        Command::Health => {
            let health = client.get("/health").await.into_result().context("Health check failed")?;
            println!("Connected to {}", client.base_url);
            print_json(&health)?;
        }
        Command::Load { resume_id } => {
            let resume_id = resume_id.trim();
            if resume_id.is_empty() {
                bail!("Please enter a resume_id");
            }
            let loaded = load_state(client, resume_id).await?;
            session.set_resume(&loaded.resume_id);
            println!("Loaded {} ({})", loaded.resume_id, loaded.version);
            println!("{}", extract_resume_text(Some(&loaded.state)));
        }
        Command::Upload { files } => {
            let files = files.iter().map(|p| upload_file(p)).collect::<Result<Vec<_>>>()?;
            let ingest: IngestResponse = client
                .post_as("/upload-resumes", &json!({ "files": files }))
                .await
                .into_result()?;
            println!("Indexed {} chunks from {}", ingest.indexed_chunks, ingest.saved_files.join(", "));
        }
        Command::Reindex => {
            let ingest: IngestResponse = client.post_as("/reindex", &json!({})).await.into_result()?;
            println!("Indexed {} chunks from {} files", ingest.indexed_chunks, ingest.saved_files.len());
        }
        Command::ParseJd { jd, no_llm } => {
            let jd_text = session.jd_text(jd.jd.as_deref())?;
            let parsed: JdParseResponse = client
                .post_as("/parse-jd", &json!({ "jd_text": jd_text, "use_llm": !no_llm }))
                .await
                .into_result()?;
            print_json(&parsed)?;
        }
        Command::Generate {
            jd,
            top_k,
            multi_query,
            parse_with_claude,
            domain_rewrite,
            target_company_type,
            bullets_per_role,
            audit,
            show_chunks,
        } => {
            let jd_text = session.jd_text(jd.jd.as_deref())?;
            let payload = json!({
                "jd_text": jd_text,
                "top_k": top_k,
                "multi_query": multi_query,
                "parse_with_claude": parse_with_claude,
                "audit": audit,
                "domain_rewrite": domain_rewrite,
                "target_company_type": target_company_type,
                "bullets_per_role": bullets_per_role,
            });
            let generated: GenerateResponse = client.post_as("/generate", &payload).await.into_result()?;
            session.set_resume(&generated.resume_id);
            info!("Generated {} with {} chunks", generated.resume_id, generated.retrieved.len());

            if show_chunks {
                print_json(&generated.retrieved)?;
            }
            if let Some(audit) = &generated.audit {
                print_json(audit)?;
            }
            println!("{}", generated.resume_text);
            println!("\nGenerated. resume_id={}", generated.resume_id);
        }
        Command::AtsScore { resume, jd, resume_file } => {
            let jd_text = session.jd_text(jd.jd.as_deref())?;
            let mut payload = json!({ "jd_text": jd_text, "top_n_skills": 25, "strict_mode": true });
            match resume_file {
                Some(path) => {
                    let text = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
                    payload["resume_text"] = Value::String(text);
                }
                None => payload["resume_id"] = Value::String(session.resume_id(resume.resume_id.as_deref())?),
            }
            let report: AtsScoreResponse = client.post_as("/ats-score", &payload).await.into_result()?;
            println!(
                "ATS Score: {} (keyword {}, role {})",
                report.ats_score, report.keyword_score, report.role_score
            );
            if let Some(reason) = &report.capped_reason {
                println!("Capped: {}", reason);
            }
            print_coverage("Required Skills", &report.required);
            print_coverage("Preferred Skills", &report.preferred);
            println!("Missing Required: {}", report.missing_required.join(", "));
        }
        Command::BlockedPlan { resume, jd, truth_mode, top_n } => {
            let truth_mode = truth_mode.unwrap_or(session.truth_mode);
            session.truth_mode = truth_mode;
            if truth_mode == TruthMode::Off {
                bail!("Enable truth_mode to use blocked plan.");
            }
            let resume_id = session.resume_id(resume.resume_id.as_deref())?;
            let jd_text = session.jd_text(jd.jd.as_deref())?;
            let payload = json!({
                "jd_text": jd_text,
                "truth_mode": truth_mode,
                "top_n": top_n,
                "strict_mode": true,
            });
            let plan: BlockedPlanResponse = client
                .post_as(&format!("/resumes/{}/blocked-plan", resume_id), &payload)
                .await
                .into_result()?;

            let roles = role_options(&load_state(client, &resume_id).await?.state);
            for item in &plan.blocked {
                println!("{} - {}", item.skill, item.reason);
                let suggested: Vec<&str> = roles
                    .iter()
                    .filter(|(_, id)| item.suggested_role_ids.contains(id))
                    .map(|(label, _)| label.as_str())
                    .collect();
                if !suggested.is_empty() {
                    println!("  suggested roles: {}", suggested.join("; "));
                }
                let example = item
                    .example_override_payload
                    .as_ref()
                    .and_then(|o| o.skills.first())
                    .and_then(|s| s.proof_bullets.first());
                if let Some(example) = example {
                    println!("  example proof: {}", example);
                }
            }
            println!("{} blocked skills", plan.blocked.len());
        }
        Command::SaveOverride {
            resume,
            skill,
            role_id,
            proof_bullet,
            hands_on,
        } => {
            let resume_id = session.resume_id(resume.resume_id.as_deref())?;
            if role_id.trim().is_empty() {
                bail!("Role is required");
            }
            if proof_bullet.trim().is_empty() {
                bail!("Proof bullet is required");
            }
            let level = if hands_on { SkillLevel::HandsOn } else { SkillLevel::WorkedWith };
            let payload = json!({
                "items": [{ "skill": skill, "level": level, "role_id": role_id, "proof_bullet": proof_bullet }]
            });
            let saved: OverridesFromBlockedResponse = client
                .post_as(&format!("/resumes/{}/overrides/from-blocked", resume_id), &payload)
                .await
                .into_result()?;
            println!("Override saved ({} skills in {})", saved.overrides.skills.len(), saved.overrides_path);
        }
        Command::SuggestPatches {
            resume,
            jd,
            truth_mode,
            no_strict,
        } => {
            let resume_id = session.resume_id(resume.resume_id.as_deref())?;
            let jd_text = session.jd_text(jd.jd.as_deref())?;
            let truth_mode = truth_mode.unwrap_or(session.truth_mode);
            session.truth_mode = truth_mode;
            let payload = json!({
                "jd_text": jd_text,
                "strict_mode": !no_strict,
                "apply_overrides": true,
                "truth_mode": truth_mode,
            });
            let suggested: SuggestPatchesResponse = client
                .post_as(&format!("/resumes/{}/suggest-patches", resume_id), &payload)
                .await
                .into_result()?;

            for (i, patch) in suggested.suggested_patches.iter().enumerate() {
                println!("[{}] {}\n    {}", i, patch_label(patch), patch.new_bullet);
            }
            if !suggested.blocked.is_empty() {
                println!("Blocked Suggestions");
                print_json(&suggested.blocked)?;
            }
            session.suggested_patches = suggested.suggested_patches;
        }
        Command::ApplyPatches {
            resume,
            indices,
            truth_mode,
            export_docx,
        } => {
            let resume_id = session.resume_id(resume.resume_id.as_deref())?;
            let patches = select_patches(&session.suggested_patches, &indices)?;
            if patches.is_empty() {
                bail!("Select at least one patch (run suggest-patches first)");
            }
            let truth_mode = truth_mode.unwrap_or(session.truth_mode);
            let payload = json!({ "patches": patches, "export_docx": export_docx, "truth_mode": truth_mode });
            let applied: Value = client
                .post(&format!("/resumes/{}/apply-patches", resume_id), &payload)
                .await
                .into_result()?;
            println!("Patches applied: {}", applied["version"].as_str().unwrap_or(""));
            session.suggested_patches.clear();
            print_latest(client, &resume_id).await?;
        }
        Command::EditBullet {
            resume,
            role_id,
            index,
            text,
            export_docx,
        } => {
            let resume_id = session.resume_id(resume.resume_id.as_deref())?;
            let text = checked_bullet(&text)?;
            let payload = json!({
                "role_selector": { "role_id": role_id },
                "bullet_index": index,
                "new_bullet": text,
                "export_docx": export_docx,
            });
            let edited: BulletEditResponse = client
                .patch_as(&format!("/resumes/{}/bullet", resume_id), &payload)
                .await
                .into_result()?;
            println!("Bullet updated ({} {})", edited.updated_role.role_id, edited.version);
            print_latest(client, &resume_id).await?;
        }
        Command::Export {
            resume,
            jd,
            company,
            position,
            job_id,
        } => {
            let resume_id = session.resume_id(resume.resume_id.as_deref())?;
            if company.trim().is_empty() || position.trim().is_empty() {
                bail!("company_name and position_name are required");
            }
            let jd_text = if jd.jd.is_some() || session.jd_path.is_some() {
                Some(session.jd_text(jd.jd.as_deref())?)
            } else {
                None
            };
            let payload = json!({
                "resume_id": resume_id,
                "company_name": company,
                "position_name": position,
                "job_id": job_id.filter(|j| !j.trim().is_empty()),
                "jd_text": jd_text,
            });
            let exported: ExportDocxResponse = client.post_as("/export-docx", &payload).await.into_result()?;
            println!("Export complete");
            print_json(&exported)?;
        }
    }
    Ok(())
}
