use std::collections::HashSet;

use log::{debug, info};
use shared::text::has_token;
use shared::{
    GenerateRequest, GenerateResponse, GenerationAudit, JdParseResponse, ResumeState, Result, RetrievedChunk,
    SharedError, SkillGrades,
};
use validator::Validate;

use crate::config::StorageConfig;
use crate::error::run_blocking;
use crate::generate::inventory::extract_experience_inventory;
use crate::generate::master::{extract_experience_headers, load_resume_documents, select_master_resume};
use crate::generate::rewriter::{dedupe_chunks, grade_skills, rewrite_chunks, DEDUPE_THRESHOLD};
use crate::jd::parser::parse_jd;
use crate::llm::client::SharedLlm;
use crate::resume::repository::ResumeRepository;
use crate::resume::state_parser::parse_resume_text_to_state;
use crate::retrieval::index::{load_index, tokenize};
use crate::retrieval::search::{jd_terms, retrieve_topk, DEFAULT_PER_QUERY_K};

/// Score bonus for a bullet that also appears in a retrieved chunk.
pub const RETRIEVAL_BONUS: usize = 2;

#[async_trait::async_trait]
pub trait GenerateUseCase: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse>;
}

pub struct GenerateUseCaseImpl<R: ResumeRepository> {
    pub repo: R,
    pub storage: StorageConfig,
    pub llm: Option<SharedLlm>,
}

/// Base resume for a generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseResume {
    pub state: ResumeState,
    pub master: Option<String>,
    pub experience_headers: Vec<String>,
}

/// Keyword terms used to rank bullets: JD tokens plus structured skill tokens.
pub fn ranking_terms(jd_text: &str, structured: &JdParseResponse) -> HashSet<String> {
    let mut terms = jd_terms(jd_text);
    for skill in structured.must_have_skills.iter().chain(&structured.nice_to_have_skills) {
        terms.extend(tokenize(skill));
    }
    terms
}

fn bullet_score(bullet: &str, terms: &HashSet<String>, backed: &[String]) -> usize {
    let tokens: HashSet<String> = tokenize(bullet).into_iter().collect();
    let overlap = tokens.intersection(terms).count();
    let needle = bullet.to_lowercase();
    if backed.iter().any(|text| text.contains(&needle)) {
        overlap + RETRIEVAL_BONUS
    } else {
        overlap
    }
}

/// Highest-scoring `keep` bullets; equal scores keep their original order.
pub fn rank_bullets(bullets: &[String], terms: &HashSet<String>, chunks: &[RetrievedChunk], keep: usize) -> Vec<String> {
    let backed: Vec<String> = chunks.iter().map(|c| c.text.to_lowercase()).collect();
    let mut scored: Vec<(usize, &String)> = bullets
        .iter()
        .map(|b| (bullet_score(b, terms, &backed), b))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().take(keep).map(|(_, b)| b.clone()).collect()
}

/// `Proficient`, `Working knowledge` and `Familiar with` lines for graded
/// skills the existing skills section does not already name.
pub fn graded_skill_lines(existing: &[String], grades: &SkillGrades) -> Vec<String> {
    let listed = existing.join(" ");
    let buckets = [
        ("Proficient", &grades.strong),
        ("Working knowledge", &grades.working),
        ("Familiar with", &grades.exposure),
    ];
    buckets
        .into_iter()
        .filter_map(|(label, skills)| {
            let fresh: Vec<&str> = skills
                .iter()
                .map(String::as_str)
                .filter(|s| !has_token(&listed, s))
                .collect();
            (!fresh.is_empty()).then(|| format!("{}: {}", label, fresh.join(", ")))
        })
        .collect()
}

/// One-line summary from the parsed JD when the base resume has none.
pub fn synthesize_summary(structured: &JdParseResponse, grades: &SkillGrades) -> String {
    let role = structured.role.trim();
    let role = if role.is_empty() || role.eq_ignore_ascii_case("unknown") {
        "Professional"
    } else {
        role
    };
    let title = match structured.seniority.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(seniority) if !role.to_lowercase().contains(&seniority.to_lowercase()) => {
            format!("{} {}", seniority, role)
        }
        _ => role.to_string(),
    };
    let top: Vec<&str> = grades
        .strong
        .iter()
        .chain(&grades.working)
        .map(String::as_str)
        .take(4)
        .collect();
    if top.is_empty() {
        format!("{}.", title)
    } else {
        format!("{} with hands-on experience in {}.", title, top.join(", "))
    }
}

/// Master resume parsed into state, or the experience inventory of every
/// resume when no master qualifies.
pub fn load_base_resume(storage: &StorageConfig) -> Result<BaseResume> {
    let docs = load_resume_documents(&storage.resumes_dir)?;
    if let Some(master) = select_master_resume(&docs) {
        let state = parse_resume_text_to_state(&master.text);
        if !state.sections.experience.is_empty() {
            return Ok(BaseResume {
                state,
                master: Some(master.name.clone()),
                experience_headers: extract_experience_headers(&master.text),
            });
        }
        debug!("Master resume {} has no roles; using the inventory", master.name);
    }
    Ok(BaseResume {
        state: extract_experience_inventory(&docs).into_state(),
        master: None,
        experience_headers: Vec::new(),
    })
}

/// Tailors `base` to the JD: ranked bullets, graded skill lines, summary.
pub fn tailor_state(
    mut base: ResumeState,
    terms: &HashSet<String>,
    chunks: &[RetrievedChunk],
    structured: &JdParseResponse,
    grades: &SkillGrades,
    bullets_per_role: usize,
) -> ResumeState {
    for role in &mut base.sections.experience {
        role.bullets = rank_bullets(&role.bullets, terms, chunks, bullets_per_role);
    }
    let extra = graded_skill_lines(&base.sections.technical_skills, grades);
    base.sections.technical_skills.extend(extra);
    if base.sections.professional_summary.trim().is_empty() {
        base.sections.professional_summary = synthesize_summary(structured, grades);
    }
    base
}

#[async_trait::async_trait]
impl<R: ResumeRepository> GenerateUseCase for GenerateUseCaseImpl<R> {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        let jd_text = request.jd_text.trim();
        if jd_text.is_empty() {
            return Err(SharedError::Validation("jd_text is required".to_string()));
        }
        request.validate()?;

        let index_dir = self.storage.index_dir.clone();
        let index = run_blocking(move || load_index(&index_dir)).await?;

        let llm = if request.parse_with_claude { self.llm.as_deref() } else { None };
        let structured = parse_jd(jd_text, llm).await;

        let mut retrieved = retrieve_topk(
            jd_text,
            &index,
            request.top_k,
            request.multi_query,
            Some(&structured),
            DEFAULT_PER_QUERY_K,
        );

        let company_type = request.target_company_type.as_deref();
        if request.domain_rewrite || company_type.is_some() {
            let domain = if request.domain_rewrite { structured.domain.as_deref() } else { None };
            retrieved = rewrite_chunks(retrieved, domain, company_type);
        }

        let (retrieved, dropped_duplicates) = dedupe_chunks(retrieved, DEDUPE_THRESHOLD);
        let skill_grades = grade_skills(Some(&structured), &retrieved);

        let storage = self.storage.clone();
        let base = run_blocking(move || load_base_resume(&storage)).await?;
        let terms = ranking_terms(jd_text, &structured);
        let state = tailor_state(
            base.state,
            &terms,
            &retrieved,
            &structured,
            &skill_grades,
            request.bullets_per_role,
        );

        let meta = self.repo.create_resume(&state).await?;
        let paths = meta
            .latest()
            .map(|v| v.paths())
            .ok_or_else(|| SharedError::Internal("resume version missing after create".to_string()))?;
        info!(
            "Generated resume {} from {} chunks ({} duplicates dropped)",
            meta.resume_id,
            retrieved.len(),
            dropped_duplicates
        );

        let audit = request.audit.then(|| GenerationAudit {
            required_direct: skill_grades.required_direct.clone(),
            required_derived: skill_grades.required_derived.clone(),
            required_missing: skill_grades.required_missing.clone(),
            dropped_duplicates,
            master_resume: base.master,
            experience_headers: base.experience_headers,
        });

        Ok(GenerateResponse {
            resume_id: meta.resume_id,
            version: meta.latest_version,
            resume_text: state.to_text(),
            retrieved,
            structured_jd: structured,
            skill_grades,
            audit,
            paths,
        })
    }
}
