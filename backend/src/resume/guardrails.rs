//! Truth guardrails: what may be added to a resume without evidence, and
//! how to plan remediation when it may not.

use std::collections::{HashMap, HashSet};

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use shared::text::has_token;
use shared::{
    AtsScoreResponse, BlockedSuggestion, OverrideSkill, OverridesRequest, PatchAction, PatchOperation,
    PatchSection, RecommendedAction, ResumeState, Result, SharedError, SkillLevel, TruthMode,
};

use crate::ats::scoring::has_direct_evidence;
use crate::ats::skills::find_skills_in_text;

/// Proof-bullet inserts allowed per role in one plan.
pub const MAX_INSERTS_PER_ROLE: usize = 2;

static ROLE_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9+#.-]+").unwrap());

const STOPWORDS: [&str; 15] = [
    "and", "or", "the", "a", "an", "to", "of", "for", "with", "in", "on", "by", "from", "as", "at",
];

fn overlap_tokens(text: &str) -> HashSet<String> {
    ROLE_TOKEN_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|t| t.len() > 2 && !STOPWORDS.contains(&t.as_str()))
        .collect()
}

/// Up to two role ids best suited to carry `skill`.
///
/// Score is token overlap between the role text and `skill + jd_context`, plus 3
/// when the role text names the skill. Ties break on role id.
pub fn suggest_roles_for_skill(state: &ResumeState, skill: &str, jd_context: Option<&str>) -> Vec<String> {
    let skill = skill.trim();
    let roles = &state.sections.experience;
    if roles.is_empty() {
        return Vec::new();
    }

    let tokens = overlap_tokens(&format!("{} {}", skill, jd_context.unwrap_or("")));
    let mut scored: Vec<(usize, &str)> = roles
        .iter()
        .map(|role| {
            let bullets = role.bullets.join(" ");
            let role_text = [
                role.company.as_str(),
                role.title.as_deref().unwrap_or(""),
                role.location.as_deref().unwrap_or(""),
                role.dates.as_deref().unwrap_or(""),
                bullets.as_str(),
            ]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
            let mut score = overlap_tokens(&role_text).intersection(&tokens).count();
            if !skill.is_empty() && has_token(&role_text, skill) {
                score += 3;
            }
            (score, role.role_id.as_str())
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));

    let top: Vec<String> = scored
        .iter()
        .filter(|(score, _)| *score > 0)
        .take(2)
        .map(|(_, id)| id.to_string())
        .collect();
    if top.is_empty() {
        scored.iter().take(2).map(|(_, id)| id.to_string()).collect()
    } else {
        top
    }
}

fn proof_context(jd_text: &str) -> &'static str {
    let text = jd_text.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| text.contains(w));
    if mentions(&["dashboard", "report", "tableau", "visualization"][..]) {
        "reporting and analytics"
    } else if mentions(&["pipeline", "ingest", "ingestion", "etl", "elt"][..]) {
        "data ingestion and transformation"
    } else if mentions(&["model", "schema", "dbt", "dimensional"][..]) {
        "data modeling"
    } else {
        "data processing"
    }
}

/// Neutral proof bullet the candidate can edit before confirming an override.
pub fn proof_bullet_template(skill: &str, jd_text: Option<&str>) -> String {
    format!(
        "Used {} to support {} workflows, improving consistency and reliability.",
        skill.trim(),
        proof_context(jd_text.unwrap_or(""))
    )
}

fn blocked_suggestion(
    skill: &str,
    reason: String,
    action: RecommendedAction,
    state: &ResumeState,
    jd_text: Option<&str>,
) -> BlockedSuggestion {
    let suggested_role_ids = suggest_roles_for_skill(state, skill, jd_text);
    let example_override_payload = (action == RecommendedAction::AddOverride).then(|| OverridesRequest {
        skills: vec![OverrideSkill {
            skill: skill.to_string(),
            level: SkillLevel::WorkedWith,
            target_roles: suggested_role_ids.iter().take(1).cloned().collect(),
            proof_bullets: vec![proof_bullet_template(skill, jd_text)],
        }],
    });
    BlockedSuggestion {
        skill: skill.to_string(),
        reason,
        recommended_action: action,
        suggested_role_ids,
        example_override_payload,
    }
}

/// Case-insensitive substring hit in skills, summary or any bullet. Looser
/// than `has_direct_evidence`: "SQL" counts as present in "PostgreSQL".
pub fn skill_already_present(state: &ResumeState, skill: &str) -> bool {
    let needle = skill.trim().to_lowercase();
    let hit = |line: &str| line.to_lowercase().contains(&needle);
    state.sections.technical_skills.iter().any(|l| hit(l))
        || state.summary_lines().into_iter().any(|l| hit(l))
        || state
            .sections
            .experience
            .iter()
            .any(|role| role.bullets.iter().any(|b| hit(b)))
}

/// Candidate patches for every missing required skill.
///
/// Skills with an override get their proof bullets appended to each existing
/// target role (at most [`MAX_INSERTS_PER_ROLE`] per role). Skills without one
/// that appear nowhere in the resume get an `Exposure to <skill>` line.
pub fn plan_suggestions(
    state: &ResumeState,
    ats: &AtsScoreResponse,
    overrides: Option<&OverridesRequest>,
) -> Vec<PatchOperation> {
    let mut suggested = Vec::new();
    let mut inserts_per_role: HashMap<String, usize> = HashMap::new();

    for skill in &ats.missing_required {
        if let Some(entry) = overrides.and_then(|o| o.find(skill)) {
            for role_id in &entry.target_roles {
                let Some(role) = state.find_role(role_id) else {
                    continue;
                };
                for proof in &entry.proof_bullets {
                    let count = inserts_per_role.entry(role_id.clone()).or_insert(0);
                    if *count >= MAX_INSERTS_PER_ROLE {
                        break;
                    }
                    *count += 1;
                    suggested.push(PatchOperation {
                        role_id: Some(role_id.clone()),
                        section: PatchSection::Experience,
                        action: PatchAction::Insert,
                        bullet_index: None,
                        after_index: Some(role.bullets.len() as i64 - 1),
                        new_bullet: proof.clone(),
                        skill: Some(skill.clone()),
                    });
                }
            }
            continue;
        }

        if skill_already_present(state, skill) {
            continue;
        }
        suggested.push(PatchOperation {
            role_id: None,
            section: PatchSection::TechnicalSkills,
            action: PatchAction::Insert,
            bullet_index: None,
            after_index: Some(state.sections.technical_skills.len() as i64 - 1),
            new_bullet: format!("Exposure to {}", skill),
            skill: Some(skill.clone()),
        });
    }
    suggested
}

/// Splits suggestions into the ones allowed under `truth_mode` and the blocked ones.
pub fn apply_truth_guardrails(
    suggestions: Vec<PatchOperation>,
    ats: &AtsScoreResponse,
    overrides: Option<&OverridesRequest>,
    truth_mode: TruthMode,
    state: &ResumeState,
    jd_text: Option<&str>,
) -> (Vec<PatchOperation>, Vec<BlockedSuggestion>) {
    if truth_mode == TruthMode::Off {
        return (suggestions, Vec::new());
    }

    let missing_required: HashSet<String> = ats.missing_required.iter().map(|s| s.to_lowercase()).collect();
    let override_skills = overrides.map(|o| o.skill_keys()).unwrap_or_default();
    let direct_skills: HashSet<String> = ats
        .required
        .iter()
        .filter(|c| c.direct_from_resume)
        .map(|c| c.skill.trim().to_lowercase())
        .collect();

    let mut allowed = Vec::new();
    let mut blocked = Vec::new();

    for patch in suggestions {
        let skill = patch.skill.as_deref().unwrap_or("").trim().to_string();
        let key = skill.to_lowercase();
        let display = if skill.is_empty() { "unknown" } else { skill.as_str() };
        let has_override = override_skills.contains(&key);
        let has_direct = direct_skills.contains(&key) || (!key.is_empty() && has_direct_evidence(state, &key));

        if patch.section == PatchSection::Experience && missing_required.contains(&key) && !has_override {
            blocked.push(blocked_suggestion(
                display,
                format!(
                    "Missing required skill without override; cannot insert into experience in {} mode.",
                    truth_mode
                ),
                RecommendedAction::AddOverride,
                state,
                jd_text,
            ));
            continue;
        }
        if truth_mode == TruthMode::Strict
            && patch.section == PatchSection::TechnicalSkills
            && !(has_direct || has_override)
        {
            blocked.push(blocked_suggestion(
                display,
                "No direct or override evidence; cannot add to technical skills in strict mode.".to_string(),
                RecommendedAction::DowngradeToExposure,
                state,
                jd_text,
            ));
            continue;
        }
        allowed.push(patch);
    }

    debug!("Truth mode {}: {} allowed, {} blocked", truth_mode, allowed.len(), blocked.len());
    (allowed, blocked)
}

/// Rejects experience patches naming a skill with neither resume nor override evidence.
pub fn validate_patches_truth_mode(
    patches: &[PatchOperation],
    state: &ResumeState,
    overrides: Option<&OverridesRequest>,
    truth_mode: TruthMode,
) -> Result<()> {
    if truth_mode == TruthMode::Off {
        return Ok(());
    }
    let override_skills = overrides.map(|o| o.skill_keys()).unwrap_or_default();

    for patch in patches.iter().filter(|p| p.section == PatchSection::Experience) {
        let skills = match patch.skill.as_deref() {
            Some(skill) if !skill.is_empty() => vec![skill.to_string()],
            _ => find_skills_in_text(&patch.new_bullet),
        };
        for skill in skills {
            let key = skill.trim().to_lowercase();
            if key.is_empty() || override_skills.contains(&key) {
                continue;
            }
            if !has_direct_evidence(state, &key) {
                return Err(SharedError::Validation(format!(
                    "Truth mode '{}' blocks experience patch without direct or override evidence for skill: {}",
                    truth_mode, skill
                )));
            }
        }
    }
    Ok(())
}
