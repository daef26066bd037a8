//! Symptom-overlap matching between patients and doctors.

use super::{FeatureVector, Role, SymptomTags, User, VitalFindings};

/// Where the tags used for matching came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagSource {
    /// Conditions declared on the patient's account.
    PatientRecord,
    /// Tags supplied with the originating request.
    Request,
    /// Conditions derived from the submitted vitals.
    Derived,
}

/// Resolve the patient's tags for matching.
///
/// Precedence is the patient record, then the request, then conditions
/// derived from the features. The result may be empty.
pub fn resolve_patient_tags(
    patient: Option<&User>,
    requested: &SymptomTags,
    features: &FeatureVector,
) -> (SymptomTags, TagSource) {
    if let Some(user) = patient.filter(|u| !u.symptoms.is_empty()) {
        return (user.symptoms.clone(), TagSource::PatientRecord);
    }
    if !requested.is_empty() {
        return (requested.clone(), TagSource::Request);
    }
    (
        VitalFindings::assess(features).conditions(),
        TagSource::Derived,
    )
}

/// Whether `candidate` is a doctor sharing at least one tag with `tags`.
pub fn is_matching_doctor(candidate: &User, tags: &SymptomTags) -> bool {
    candidate.role == Role::Doctor && candidate.symptoms.overlaps(tags)
}

/// Every doctor in `candidates` sharing at least one tag with `tags`.
///
/// Any single shared tag qualifies; there is no weighting.
pub fn match_doctors<'a, I>(tags: &SymptomTags, candidates: I) -> Vec<&'a User>
where
    I: IntoIterator<Item = &'a User>,
{
    if tags.is_empty() {
        return Vec::new();
    }
    candidates
        .into_iter()
        .filter(|candidate| is_matching_doctor(candidate, tags))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EmailAddress, PasswordHash, UserId};
    use chrono::Utc;
    use rstest::{fixture, rstest};

    fn user(name: &str, role: Role, tags: &[&str]) -> User {
        User {
            id: UserId::random(),
            name: name.to_owned(),
            email: EmailAddress::parse(&format!("{name}@example.com")).expect("email"),
            password_hash: PasswordHash::from_encoded("x"),
            role,
            number: None,
            symptoms: SymptomTags::new(tags.iter().copied()),
            created_at: Utc::now(),
        }
    }

    #[fixture]
    fn directory() -> Vec<User> {
        vec![
            user("endo", Role::Doctor, &["Diabetes"]),
            user("cardio", Role::Doctor, &["Heart Disease", "Hypertension"]),
            user("pulmo", Role::Doctor, &["Asthma"]),
            user("nobody", Role::Doctor, &[]),
            user("patient", Role::Patient, &["Diabetes"]),
        ]
    }

    fn names(found: &[&User]) -> Vec<String> {
        found.iter().map(|u| u.name.clone()).collect()
    }

    #[rstest]
    fn only_overlapping_doctors_match(directory: Vec<User>) {
        let tags = SymptomTags::new(["Diabetes"]);
        assert_eq!(names(&match_doctors(&tags, &directory)), ["endo"]);
    }

    #[rstest]
    fn any_shared_tag_qualifies(directory: Vec<User>) {
        let tags = SymptomTags::new(["Asthma", "Hypertension"]);
        assert_eq!(names(&match_doctors(&tags, &directory)), ["cardio", "pulmo"]);
    }

    #[rstest]
    fn disjoint_or_empty_tags_match_nobody(directory: Vec<User>) {
        assert!(match_doctors(&SymptomTags::new(["Migraine"]), &directory).is_empty());
        assert!(match_doctors(&SymptomTags::default(), &directory).is_empty());
    }

    #[test]
    fn patient_record_takes_precedence() {
        let patient = user("pat", Role::Patient, &["Asthma"]);
        let requested = SymptomTags::new(["Diabetes"]);
        let features = FeatureVector::new(vec![150.0, 80.0, 70.0, 90.0, 36.6, 98.0]);
        let (tags, source) = resolve_patient_tags(Some(&patient), &requested, &features);
        assert_eq!(tags.as_slice(), ["Asthma"]);
        assert_eq!(source, TagSource::PatientRecord);
    }

    #[test]
    fn request_tags_used_when_record_has_none() {
        let patient = user("pat", Role::Patient, &[]);
        let requested = SymptomTags::new(["Diabetes"]);
        let (tags, source) =
            resolve_patient_tags(Some(&patient), &requested, &FeatureVector::default());
        assert_eq!(tags.as_slice(), ["Diabetes"]);
        assert_eq!(source, TagSource::Request);
    }

    #[test]
    fn derived_tags_used_as_last_resort() {
        let features = FeatureVector::new(vec![150.0, 90.0, 80.0, 150.0, 37.0, 98.0]);
        let (tags, source) = resolve_patient_tags(None, &SymptomTags::default(), &features);
        assert_eq!(tags.as_slice(), ["Hypertension", "Diabetes"]);
        assert_eq!(source, TagSource::Derived);
    }
}
