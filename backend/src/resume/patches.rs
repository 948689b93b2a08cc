use shared::text::clean_bullet;
use shared::{PatchAction, PatchOperation, PatchSection, ResumeState, Result, SharedError};

fn invalid(message: &str) -> SharedError {
    SharedError::Validation(message.to_string())
}

/// Insert position after `after_index` (default: after the last item).
fn insert_position(after_index: Option<i64>, len: usize) -> Result<usize> {
    let len = len as i64;
    let idx = after_index.unwrap_or(len - 1);
    if idx < -1 || idx >= len {
        return Err(invalid("after_index out of range"));
    }
    Ok((idx + 1) as usize)
}

fn apply_experience_patch(state: &mut ResumeState, patch: &PatchOperation) -> Result<()> {
    let role_id = patch
        .role_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| invalid("role_id is required"))?;
    let role = state
        .find_role_mut(role_id)
        .ok_or_else(|| invalid("role_id not found"))?;
    let bullet = clean_bullet(&patch.new_bullet);

    match patch.action {
        PatchAction::Replace => {
            let idx = patch
                .bullet_index
                .filter(|i| *i >= 0 && (*i as usize) < role.bullets.len())
                .ok_or_else(|| invalid("bullet_index out of range"))?;
            role.bullets[idx as usize] = bullet;
        }
        PatchAction::Insert => {
            let at = insert_position(patch.after_index, role.bullets.len())?;
            role.bullets.insert(at, bullet);
        }
    }
    Ok(())
}

fn apply_skill_patch(state: &mut ResumeState, patch: &PatchOperation) -> Result<()> {
    if patch.action != PatchAction::Insert {
        return Err(invalid("Only insert is supported for technical_skills"));
    }
    let skills = &mut state.sections.technical_skills;
    let at = insert_position(patch.after_index, skills.len())?;
    skills.insert(at, clean_bullet(&patch.new_bullet));
    Ok(())
}

/// Applies patches in order. Stops at the first invalid patch; earlier
/// patches stay applied, so callers work on a copy.
pub fn apply_patches_to_state(state: &mut ResumeState, patches: &[PatchOperation]) -> Result<()> {
    for patch in patches {
        match patch.section {
            PatchSection::TechnicalSkills => apply_skill_patch(state, patch)?,
            PatchSection::Experience => apply_experience_patch(state, patch)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use shared::{ResumeSections, Role};

    #[fixture]
    fn state() -> ResumeState {
        ResumeState {
            sections: ResumeSections {
                technical_skills: vec!["SQL, Python".to_string()],
                experience: vec![Role {
                    role_id: "role_1".to_string(),
                    company: "Acme".to_string(),
                    bullets: vec!["First".to_string(), "Second".to_string()],
                    ..Default::default()
                }],
                ..Default::default()
            },
        }
    }

    fn experience(action: PatchAction, bullet_index: Option<i64>, after_index: Option<i64>) -> PatchOperation {
        PatchOperation {
            role_id: Some("role_1".to_string()),
            section: PatchSection::Experience,
            action,
            bullet_index,
            after_index,
            new_bullet: "- New\tbullet ".to_string(),
            skill: None,
        }
    }

    #[rstest]
    fn test_insert_defaults_to_end(mut state: ResumeState) {
        apply_patches_to_state(&mut state, &[experience(PatchAction::Insert, None, None)]).unwrap();
        assert_eq!(state.sections.experience[0].bullets, vec!["First", "Second", "New bullet"]);
    }

    #[rstest]
    fn test_insert_at_front(mut state: ResumeState) {
        apply_patches_to_state(&mut state, &[experience(PatchAction::Insert, None, Some(-1))]).unwrap();
        assert_eq!(state.sections.experience[0].bullets[0], "New bullet");
    }

    #[rstest]
    fn test_replace(mut state: ResumeState) {
        apply_patches_to_state(&mut state, &[experience(PatchAction::Replace, Some(1), None)]).unwrap();
        assert_eq!(state.sections.experience[0].bullets, vec!["First", "New bullet"]);
    }

    #[rstest]
    #[case(experience(PatchAction::Replace, Some(2), None), "bullet_index out of range")]
    #[case(experience(PatchAction::Replace, None, None), "bullet_index out of range")]
    #[case(experience(PatchAction::Insert, None, Some(2)), "after_index out of range")]
    #[case(experience(PatchAction::Insert, None, Some(-2)), "after_index out of range")]
    #[case(PatchOperation { role_id: None, ..experience(PatchAction::Insert, None, None) }, "role_id is required")]
    #[case(PatchOperation { role_id: Some("role_9".into()), ..experience(PatchAction::Insert, None, None) }, "role_id not found")]
    #[case(
        PatchOperation { section: PatchSection::TechnicalSkills, ..experience(PatchAction::Replace, Some(0), None) },
        "Only insert is supported for technical_skills"
    )]
    fn test_invalid_patches(mut state: ResumeState, #[case] patch: PatchOperation, #[case] message: &str) {
        let err = apply_patches_to_state(&mut state, &[patch]).unwrap_err();
        assert_eq!(err, SharedError::Validation(message.to_string()));
    }

    #[rstest]
    fn test_skill_insert(mut state: ResumeState) {
        let patch = PatchOperation {
            section: PatchSection::TechnicalSkills,
            new_bullet: "Exposure to Kafka".to_string(),
            ..Default::default()
        };
        apply_patches_to_state(&mut state, &[patch]).unwrap();
        assert_eq!(state.sections.technical_skills, vec!["SQL, Python", "Exposure to Kafka"]);
    }
}
