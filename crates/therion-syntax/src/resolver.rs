//! Reference resolution across the survey hierarchy.
//!
//! A reference names a station as `id` or `id@s1.s2`, where the dot-path
//! lists survey names top-down starting below the viewing survey. Forward
//! resolution turns the text into a station; reverse resolution turns a
//! station back into the text a given survey would write for it.

use std::fmt;
use std::str::FromStr;

use therion_common::constants::{PATH_SEPARATOR, REFERENCE_SEPARATOR};
use therion_common::error::{Result, TherionError};

use crate::survey::{StationId, SurveyId, SurveyTree};

/// A local id qualified by a top-down path of survey names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    id: String,
    path: Vec<String>,
}

impl Reference {
    /// Creates a reference from its parts.
    ///
    /// # Errors
    ///
    /// Returns an error if the id or any path segment is empty.
    pub fn new(id: impl Into<String>, path: Vec<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(TherionError::invalid_reference(&id, "empty local id"));
        }
        if path.iter().any(String::is_empty) {
            return Err(TherionError::invalid_reference(
                format!("{id}{REFERENCE_SEPARATOR}{}", join_path(&path)),
                "empty survey name in path",
            ));
        }
        Ok(Self { id, path })
    }

    /// Local identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Survey names, outermost first.
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Whether the reference is a bare local id.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.path.is_empty()
    }
}

impl FromStr for Reference {
    type Err = TherionError;

    fn from_str(s: &str) -> Result<Self> {
        let Some((id, path)) = s.split_once(REFERENCE_SEPARATOR) else {
            return Self::new(s, Vec::new()).map_err(|e| relabel(e, s));
        };
        let path = path.split(PATH_SEPARATOR).map(str::to_string).collect();
        Self::new(id, path).map_err(|e| relabel(e, s))
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)?;
        if !self.path.is_empty() {
            write!(f, "{REFERENCE_SEPARATOR}{}", join_path(&self.path))?;
        }
        Ok(())
    }
}

fn join_path(path: &[String]) -> String {
    path.join(&*PATH_SEPARATOR.encode_utf8(&mut [0; 4]))
}

fn relabel(err: TherionError, reference: &str) -> TherionError {
    match err {
        TherionError::InvalidReference { message, .. } => {
            TherionError::invalid_reference(reference, message)
        }
        other => other,
    }
}

/// An object that can be addressed by a reference.
pub trait Addressable {
    /// Name of the object within its survey.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not part of `tree`.
    fn local_id(&self, tree: &SurveyTree) -> Result<String>;

    /// Innermost survey the object belongs to, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not part of `tree`.
    fn survey_context(&self, tree: &SurveyTree) -> Result<Option<SurveyId>>;
}

impl Addressable for StationId {
    fn local_id(&self, tree: &SurveyTree) -> Result<String> {
        Ok(tree.station(*self)?.name.clone())
    }

    fn survey_context(&self, tree: &SurveyTree) -> Result<Option<SurveyId>> {
        tree.station_survey(*self).map(Some)
    }
}

/// An object known only by its name and, optionally, a survey.
///
/// Produced for references that appear outside any parsed survey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LooseObject {
    /// Local identifier.
    pub id: String,
    /// Innermost survey, usually synthetic.
    pub survey: Option<SurveyId>,
}

impl Addressable for LooseObject {
    fn local_id(&self, _tree: &SurveyTree) -> Result<String> {
        Ok(self.id.clone())
    }

    fn survey_context(&self, _tree: &SurveyTree) -> Result<Option<SurveyId>> {
        Ok(self.survey)
    }
}

impl SurveyTree {
    /// Resolves `reference` as written inside survey `viewer`.
    ///
    /// # Errors
    ///
    /// Returns an invalid-reference error if the text is malformed, a path
    /// segment names no child survey, or no station matches the id.
    pub fn resolve(&self, reference: &str, viewer: SurveyId) -> Result<StationId> {
        let parsed: Reference = reference.parse()?;
        self.resolve_reference(&parsed, viewer)
    }

    /// Resolves an already-parsed reference from survey `viewer`.
    ///
    /// # Errors
    ///
    /// See [`SurveyTree::resolve`].
    pub fn resolve_reference(&self, reference: &Reference, viewer: SurveyId) -> Result<StationId> {
        let mut survey = viewer;
        for segment in reference.path() {
            survey = self.child_named(survey, segment)?.ok_or_else(|| {
                TherionError::invalid_reference(
                    reference.to_string(),
                    format!(
                        "survey \"{}\" has no child survey \"{segment}\"",
                        self.survey(survey).map_or("?", |s| s.name())
                    ),
                )
            })?;
        }

        for &centreline in self.survey(survey)?.centrelines() {
            for &station in &self.centreline(centreline)?.stations {
                if self.station(station)?.name == reference.id() {
                    tracing::debug!(%reference, "resolved station reference");
                    return Ok(station);
                }
            }
        }
        Err(TherionError::invalid_reference(
            reference.to_string(),
            format!(
                "no station \"{}\" in survey \"{}\"",
                reference.id(),
                self.survey(survey)?.name()
            ),
        ))
    }

    /// Builds the reference `viewer` would write for `object`.
    ///
    /// With no viewer the full ancestor chain is returned.
    ///
    /// # Errors
    ///
    /// Returns an unexpected-state error if the object has no survey, and an
    /// invalid-reference error if `viewer` is not among its ancestors.
    pub fn reference_to<A: Addressable>(
        &self,
        object: &A,
        viewer: Option<SurveyId>,
    ) -> Result<Reference> {
        let id = object.local_id(self)?;
        let Some(mut current) = object.survey_context(self)? else {
            return Err(TherionError::unexpected_state(format!(
                "object \"{id}\" has no survey context"
            )));
        };
        let viewer_name = viewer
            .map(|v| self.survey(v).map(|s| s.name().to_string()))
            .transpose()?;

        let mut collected = Vec::new();
        loop {
            let node = self.survey(current)?;
            if viewer_name.as_deref() == Some(node.name()) {
                break;
            }
            collected.push(node.name().to_string());
            match node.parent() {
                Some(parent) => current = parent,
                None if viewer_name.is_none() => break,
                None => {
                    return Err(TherionError::invalid_reference(
                        id,
                        format!(
                            "survey \"{}\" is not an ancestor of the object",
                            viewer_name.unwrap_or_default()
                        ),
                    ));
                }
            }
        }
        collected.reverse();
        Reference::new(id, collected)
    }

    /// Materializes a reference seen outside any survey.
    ///
    /// The path becomes a chain of synthetic surveys and the returned object
    /// points at its innermost link.
    pub fn detach(&mut self, reference: &Reference) -> LooseObject {
        LooseObject {
            id: reference.id().to_string(),
            survey: self.add_synthetic_chain(reference.path()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `cave` > `upper` > `deep`, each with one centreline.
    fn sample() -> (SurveyTree, [SurveyId; 3], [StationId; 3]) {
        let mut tree = SurveyTree::new();
        let cave = tree.add_root("cave");
        let upper = tree.add_survey(cave, "upper").expect("upper");
        let deep = tree.add_survey(upper, "deep").expect("deep");
        let c0 = tree.add_centreline(cave).expect("centreline");
        let c1 = tree.add_centreline(upper).expect("centreline");
        let c2 = tree.add_centreline(deep).expect("centreline");
        let s0 = tree.add_station(c0, "0").expect("station");
        let s1 = tree.add_station(c1, "1").expect("station");
        let s2 = tree.add_station(c2, "2").expect("station");
        (tree, [cave, upper, deep], [s0, s1, s2])
    }

    #[test]
    fn parse_and_display() {
        let r: Reference = "1@a.b".parse().expect("parse");
        assert_eq!(r.id(), "1");
        assert_eq!(r.path(), ["a", "b"]);
        assert_eq!(r.to_string(), "1@a.b");

        let local: Reference = "entrance".parse().expect("parse");
        assert!(local.is_local());
        assert_eq!(local.to_string(), "entrance");
    }

    #[test]
    fn malformed_references_are_rejected() {
        for text in ["", "@a", "1@", "1@a..b", "1@.a"] {
            let err = text.parse::<Reference>().unwrap_err();
            assert!(
                matches!(err, TherionError::InvalidReference { .. }),
                "{text:?} gave {err}"
            );
        }
    }

    #[test]
    fn forward_resolution_walks_down() {
        let (tree, [cave, upper, _], [s0, s1, s2]) = sample();
        assert_eq!(tree.resolve("0", cave).expect("local"), s0);
        assert_eq!(tree.resolve("1@upper", cave).expect("one level"), s1);
        assert_eq!(tree.resolve("2@upper.deep", cave).expect("two levels"), s2);
        assert_eq!(tree.resolve("2@deep", upper).expect("from upper"), s2);
    }

    #[test]
    fn forward_resolution_failures() {
        let (tree, [cave, upper, _], _) = sample();
        for (text, viewer) in [("1@nowhere", cave), ("9@upper", cave), ("0", upper)] {
            assert!(
                matches!(
                    tree.resolve(text, viewer),
                    Err(TherionError::InvalidReference { .. })
                ),
                "{text} should not resolve"
            );
        }
    }

    #[test]
    fn reverse_resolution_is_top_down() {
        let (tree, [cave, upper, deep], [_, _, s2]) = sample();
        assert_eq!(
            tree.reference_to(&s2, Some(cave)).expect("from cave").to_string(),
            "2@upper.deep"
        );
        assert_eq!(
            tree.reference_to(&s2, Some(upper)).expect("from upper").to_string(),
            "2@deep"
        );
        assert_eq!(
            tree.reference_to(&s2, Some(deep)).expect("from deep").to_string(),
            "2"
        );
        assert_eq!(
            tree.reference_to(&s2, None).expect("no viewer").to_string(),
            "2@cave.upper.deep"
        );
    }

    #[test]
    fn reverse_then_forward_round_trips() {
        let (tree, surveys, stations) = sample();
        for (depth, &viewer) in surveys.iter().enumerate() {
            for &station in &stations[depth..] {
                let text = tree
                    .reference_to(&station, Some(viewer))
                    .expect("reverse")
                    .to_string();
                assert_eq!(tree.resolve(&text, viewer).expect("forward"), station);
            }
        }
    }

    #[test]
    fn reverse_from_unrelated_viewer_fails() {
        let (mut tree, _, [s0, _, _]) = sample();
        let other = tree.add_root("other");
        assert!(matches!(
            tree.reference_to(&s0, Some(other)),
            Err(TherionError::InvalidReference { .. })
        ));
    }

    #[test]
    fn object_without_survey_is_unexpected() {
        let tree = SurveyTree::new();
        let loose = LooseObject {
            id: "x".into(),
            survey: None,
        };
        assert!(matches!(
            tree.reference_to(&loose, None),
            Err(TherionError::UnexpectedState { .. })
        ));
    }

    #[test]
    fn detached_reference_reproduces_text() {
        let mut tree = SurveyTree::new();
        let reference: Reference = "7@north.shaft".parse().expect("parse");
        let loose = tree.detach(&reference);
        assert_eq!(
            tree.reference_to(&loose, None).expect("reverse"),
            reference
        );
    }

    #[test]
    fn detached_synthetic_surveys_have_no_children() {
        let mut tree = SurveyTree::new();
        let loose = tree.detach(&"1@a".parse().expect("parse"));
        let a = loose.survey.expect("survey");
        assert!(matches!(
            tree.resolve("1@b", a),
            Err(TherionError::InvalidReference { .. })
        ));
    }
}
