use crate::profile::domain::draft::Draft;
use crate::profile::domain::entities::{has_text, Education, Skill};

/// Comparison text: lower-case, trimmed, internal whitespace collapsed.
pub fn comparison_key(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

const ACRONYM_FILLERS: [&str; 5] = ["of", "and", "in", "the", "&"];

/// "computer science" -> "cs". Single words have no acronym.
fn acronym(key: &str) -> Option<String> {
    let words: Vec<&str> = key
        .split(' ')
        .filter(|w| !w.is_empty() && !ACRONYM_FILLERS.contains(w))
        .collect();
    if words.len() < 2 {
        return None;
    }
    Some(words.iter().filter_map(|w| w.chars().next()).collect())
}

fn fields_compatible(a: &Option<String>, b: &Option<String>) -> bool {
    if !has_text(a) || !has_text(b) {
        return true;
    }
    let a = comparison_key(a.as_deref().unwrap_or_default());
    let b = comparison_key(b.as_deref().unwrap_or_default());

    a == b
        || a.contains(&b)
        || b.contains(&a)
        || acronym(&a).is_some_and(|acr| acr == b)
        || acronym(&b).is_some_and(|acr| acr == a)
}

/// Two records denote the same credential when school and degree match
/// exactly (after normalization) and the fields of study do not disagree.
pub fn same_education(a: &Education, b: &Education) -> bool {
    comparison_key(&a.school) == comparison_key(&b.school)
        && comparison_key(&a.degree) == comparison_key(&b.degree)
        && fields_compatible(&a.field, &b.field)
}

fn fill_text(kept: &mut String, incoming: String) {
    if kept.trim().is_empty() {
        *kept = incoming;
    }
}

fn fill_optional(kept: &mut Option<String>, incoming: Option<String>) {
    if !has_text(kept) && has_text(&incoming) {
        *kept = incoming;
    }
}

/// Folds `incoming` into `kept`. Empty fields are filled, non-empty ones are
/// kept, except the field of study where the longer (more specific) wording wins.
fn merge_education(kept: &mut Education, incoming: Education) {
    fill_text(&mut kept.id, incoming.id);
    fill_text(&mut kept.school, incoming.school);
    fill_text(&mut kept.degree, incoming.degree);

    let richer_field = match (&kept.field, &incoming.field) {
        (Some(k), Some(i)) if has_text(&incoming.field) => {
            comparison_key(i).len() > comparison_key(k).len()
        }
        _ => false,
    };
    if richer_field {
        kept.field = incoming.field;
    } else {
        fill_optional(&mut kept.field, incoming.field);
    }

    fill_optional(&mut kept.grade, incoming.grade);
    fill_optional(&mut kept.activities, incoming.activities);
    fill_optional(&mut kept.description, incoming.description);

    kept.start_date = match (kept.start_date, incoming.start_date) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    };

    if kept.current || incoming.current {
        kept.current = true;
        kept.end_date = None;
    } else {
        kept.end_date = match (kept.end_date, incoming.end_date) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }
}

fn merge_pass(records: Vec<Education>) -> (Vec<Education>, bool) {
    let mut kept: Vec<Education> = Vec::with_capacity(records.len());
    let mut merged_any = false;

    for record in records {
        match kept.iter().position(|k| same_education(k, &record)) {
            Some(pos) => {
                merge_education(&mut kept[pos], record);
                merged_any = true;
            }
            None => kept.push(record),
        }
    }
    (kept, merged_any)
}

/// Collapses near-duplicate education records and orders the result most
/// recent first.
///
/// Merging can widen a record's field of study so that it now matches a
/// record it did not match before; passes repeat until nothing merges, which
/// makes the result a fixed point: `dedup_education(dedup_education(c)) ==
/// dedup_education(c)`.
pub fn dedup_education(records: Vec<Education>) -> Vec<Education> {
    let mut kept: Vec<Education> = records
        .into_iter()
        .filter(|e| !e.school.trim().is_empty() || !e.degree.trim().is_empty())
        .map(|mut e| {
            if e.current {
                e.end_date = None;
            }
            e
        })
        .collect();

    loop {
        let (next, merged_any) = merge_pass(kept);
        kept = next;
        if !merged_any {
            break;
        }
    }

    // None sorts below Some, so undated records land last
    kept.sort_by(|a, b| b.start_date.cmp(&a.start_date));
    kept
}

/// Skills with the same comparison name collapse into the first one, keeping
/// the higher proficiency and the first non-empty description.
pub fn dedup_skills(skills: Vec<Skill>) -> Vec<Skill> {
    let mut kept: Vec<Skill> = Vec::with_capacity(skills.len());
    for skill in skills {
        let key = comparison_key(&skill.name);
        if key.is_empty() {
            continue;
        }
        match kept.iter_mut().find(|k| comparison_key(&k.name) == key) {
            Some(existing) => {
                existing.proficiency = existing.proficiency.max(skill.proficiency);
                fill_text(&mut existing.description, skill.description);
            }
            None => kept.push(skill),
        }
    }
    kept
}

/// Enforces the cross-field invariants of a submitted record before it is
/// folded into its collection: an ongoing position or programme has no end
/// date, and a credential that never expires has no expiration date.
pub fn settle(draft: Draft) -> Draft {
    match draft {
        Draft::Experience(mut exp) => {
            if exp.current {
                exp.end_date = None;
            }
            Draft::Experience(exp)
        }
        Draft::Education(mut edu) => {
            if edu.current {
                edu.end_date = None;
            }
            Draft::Education(edu)
        }
        Draft::Certification(mut cert) => {
            if cert.does_not_expire {
                cert.expiration_date = None;
            }
            Draft::Certification(cert)
        }
        other => other,
    }
}
