//! Deterministic ATS-style scoring of a resume against a job description.

use shared::text::{dedupe_preserve, has_token};
use shared::{AtsScoreResponse, CoverageStatus, EvidenceSection, ResumeState, SkillCoverage, SkillEvidence};

use crate::ats::skills::{extract_skills_from_jd, matches_synonym, must_have_gates};

pub const SCORE_CAP: i64 = 40;
pub const CAPPED_REASON: &str = "Missing domain must-have evidence";

/// Python-style rounding (half to even) into an integer score.
fn round_score(value: f64) -> i64 {
    value.round_ties_even() as i64
}

fn find_evidence(skill: &str, state: &ResumeState, allow_synonyms: bool) -> Vec<SkillEvidence> {
    let matches = |text: &str| has_token(text, skill) || (allow_synonyms && matches_synonym(skill, text));
    let mut evidence = Vec::new();

    for line in state.summary_lines() {
        if matches(line) {
            evidence.push(SkillEvidence {
                section: EvidenceSection::Summary,
                role_id: None,
                bullet_index: None,
                snippet: line.to_string(),
            });
        }
    }
    for line in &state.sections.technical_skills {
        if matches(line.as_str()) {
            evidence.push(SkillEvidence {
                section: EvidenceSection::TechnicalSkills,
                role_id: None,
                bullet_index: None,
                snippet: line.clone(),
            });
        }
    }
    for role in &state.sections.experience {
        for (idx, bullet) in role.bullets.iter().enumerate() {
            if matches(bullet.as_str()) {
                evidence.push(SkillEvidence {
                    section: EvidenceSection::Experience,
                    role_id: Some(role.role_id.clone()),
                    bullet_index: Some(idx),
                    snippet: bullet.clone(),
                });
            }
        }
    }
    evidence
}

pub fn coverage_for_skills(skills: &[String], state: &ResumeState, strict_mode: bool) -> Vec<SkillCoverage> {
    skills
        .iter()
        .map(|skill| {
            let direct = find_evidence(skill, state, false);
            if !direct.is_empty() {
                return SkillCoverage {
                    skill: skill.clone(),
                    status: CoverageStatus::Direct,
                    evidence: direct,
                    direct_from_resume: true,
                };
            }
            if !strict_mode {
                let partial = find_evidence(skill, state, true);
                if !partial.is_empty() {
                    return SkillCoverage {
                        skill: skill.clone(),
                        status: CoverageStatus::Partial,
                        evidence: partial,
                        direct_from_resume: false,
                    };
                }
            }
            SkillCoverage {
                skill: skill.clone(),
                status: CoverageStatus::Missing,
                evidence: Vec::new(),
                direct_from_resume: false,
            }
        })
        .collect()
}

fn count_covered(coverage: &[SkillCoverage], strict_mode: bool) -> f64 {
    coverage
        .iter()
        .map(|c| match c.status {
            CoverageStatus::Direct => 1.0,
            CoverageStatus::Partial if !strict_mode => 0.5,
            _ => 0.0,
        })
        .sum()
}

/// True when the skill appears as a whole token in skills, summary or any bullet.
pub fn has_direct_evidence(state: &ResumeState, skill: &str) -> bool {
    let token = skill.trim().to_lowercase();
    if token.is_empty() {
        return false;
    }
    state.sections.technical_skills.iter().any(|l| has_token(l, &token))
        || state.summary_lines().iter().any(|l| has_token(l, &token))
        || state
            .sections
            .experience
            .iter()
            .any(|role| role.bullets.iter().any(|b| has_token(b, &token)))
}

pub fn score_resume_against_jd(
    jd_text: &str,
    state: &ResumeState,
    top_n_skills: usize,
    strict_mode: bool,
) -> AtsScoreResponse {
    let skills = extract_skills_from_jd(jd_text, top_n_skills);
    let required = coverage_for_skills(&skills.required, state, strict_mode);
    let preferred = coverage_for_skills(&skills.preferred, state, strict_mode);

    let req_total = skills.required.len() as f64;
    let pref_total = skills.preferred.len() as f64;
    let req_covered = count_covered(&required, strict_mode);
    let pref_covered = count_covered(&preferred, strict_mode);

    let mut keyword_score = 0;
    if req_total > 0.0 || pref_total > 0.0 {
        let req_ratio = if req_total > 0.0 { req_covered / req_total } else { 0.0 };
        let pref_ratio = if pref_total > 0.0 { pref_covered / pref_total } else { 0.0 };
        keyword_score = if pref_total == 0.0 {
            round_score(req_ratio * 100.0)
        } else {
            round_score(req_ratio * 70.0 + pref_ratio * 30.0)
        };
    }
    let keyword_score = keyword_score.clamp(0, 100);

    let direct_required = required
        .iter()
        .filter(|c| c.status == CoverageStatus::Direct)
        .count() as f64;
    let role_score = if req_total > 0.0 {
        round_score(direct_required / req_total * 100.0)
    } else {
        keyword_score
    };

    let mut ats_score = round_score(keyword_score as f64 * 0.6 + role_score as f64 * 0.4);

    let missing_must_have: Vec<String> = must_have_gates(jd_text)
        .into_iter()
        .filter(|kw| !has_direct_evidence(state, kw))
        .collect();
    let capped_reason = if missing_must_have.is_empty() {
        None
    } else {
        ats_score = ats_score.min(SCORE_CAP);
        Some(CAPPED_REASON.to_string())
    };

    let missing_of = |coverage: &[SkillCoverage]| -> Vec<String> {
        coverage
            .iter()
            .filter(|c| c.status == CoverageStatus::Missing)
            .map(|c| c.skill.clone())
            .collect()
    };

    AtsScoreResponse {
        ats_score,
        keyword_score,
        role_score,
        capped_reason,
        missing_must_have: (!missing_must_have.is_empty()).then(|| dedupe_preserve(&missing_must_have)),
        missing_required: missing_of(&required),
        missing_preferred: missing_of(&preferred),
        required,
        preferred,
    }
}
