//! Arena of survey, centreline, and station nodes.
//!
//! Nodes are addressed by stable indices. Children are owned by the arena;
//! a node refers to its parent by index only, so the parent/child graph has
//! no ownership cycles. A parent is always allocated before its children.

use serde::Serialize;
use therion_common::error::{Result, TherionError};

/// Index of a survey node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SurveyId(usize);

/// Index of a centreline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CentrelineId(usize);

/// Index of a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StationId(usize);

/// A named survey container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurveyNode {
    /// A survey parsed from source, owning nested surveys and centrelines.
    Real {
        /// Survey name.
        name: String,
        /// Enclosing survey.
        parent: Option<SurveyId>,
        /// Nested surveys, in source order.
        children: Vec<SurveyId>,
        /// Centrelines declared directly in this survey.
        centrelines: Vec<CentrelineId>,
    },
    /// A name-only link built to carry reference path segments.
    Synthetic {
        /// Survey name.
        name: String,
        /// Enclosing survey.
        parent: Option<SurveyId>,
    },
}

impl SurveyNode {
    /// The survey's name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Real { name, .. } | Self::Synthetic { name, .. } => name,
        }
    }

    /// The enclosing survey, if any.
    #[must_use]
    pub const fn parent(&self) -> Option<SurveyId> {
        match self {
            Self::Real { parent, .. } | Self::Synthetic { parent, .. } => *parent,
        }
    }

    /// Nested surveys; always empty for synthetic nodes.
    #[must_use]
    pub fn children(&self) -> &[SurveyId] {
        match self {
            Self::Real { children, .. } => children,
            Self::Synthetic { .. } => &[],
        }
    }

    /// Owned centrelines; always empty for synthetic nodes.
    #[must_use]
    pub fn centrelines(&self) -> &[CentrelineId] {
        match self {
            Self::Real { centrelines, .. } => centrelines,
            Self::Synthetic { .. } => &[],
        }
    }

    /// Whether this node only carries a name.
    #[must_use]
    pub const fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic { .. })
    }
}

/// A centreline and the stations it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Centreline {
    /// Owning survey.
    pub survey: SurveyId,
    /// Stations in declaration order.
    pub stations: Vec<StationId>,
}

/// A named survey station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Station {
    /// Station name, local to its survey.
    pub name: String,
    /// Declaring centreline.
    pub centreline: CentrelineId,
}

/// Arena holding the survey hierarchy.
#[derive(Debug, Clone, Default)]
pub struct SurveyTree {
    surveys: Vec<SurveyNode>,
    centrelines: Vec<Centreline>,
    stations: Vec<Station>,
}

impl SurveyTree {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a top-level survey.
    pub fn add_root(&mut self, name: impl Into<String>) -> SurveyId {
        let id = SurveyId(self.surveys.len());
        self.surveys.push(SurveyNode::Real {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            centrelines: Vec::new(),
        });
        id
    }

    /// Adds a survey nested in `parent`.
    ///
    /// # Errors
    ///
    /// Returns an error if `parent` is unknown or synthetic.
    pub fn add_survey(&mut self, parent: SurveyId, name: impl Into<String>) -> Result<SurveyId> {
        let id = SurveyId(self.surveys.len());
        match self.surveys.get_mut(parent.0) {
            Some(SurveyNode::Real { children, .. }) => children.push(id),
            Some(SurveyNode::Synthetic { name, .. }) => {
                return Err(TherionError::unexpected_state(format!(
                    "synthetic survey \"{name}\" cannot own surveys"
                )));
            }
            None => return Err(dangling("survey", parent.0)),
        }
        self.surveys.push(SurveyNode::Real {
            name: name.into(),
            parent: Some(parent),
            children: Vec::new(),
            centrelines: Vec::new(),
        });
        Ok(id)
    }

    /// Builds a synthetic chain from top-down names, returning the innermost.
    ///
    /// Returns `None` for an empty path.
    pub fn add_synthetic_chain<S: AsRef<str>>(&mut self, path: &[S]) -> Option<SurveyId> {
        let mut parent = None;
        for name in path {
            let id = SurveyId(self.surveys.len());
            self.surveys.push(SurveyNode::Synthetic {
                name: name.as_ref().to_string(),
                parent,
            });
            parent = Some(id);
        }
        parent
    }

    /// Adds a centreline owned by `survey`.
    ///
    /// # Errors
    ///
    /// Returns an error if `survey` is unknown or synthetic.
    pub fn add_centreline(&mut self, survey: SurveyId) -> Result<CentrelineId> {
        let id = CentrelineId(self.centrelines.len());
        match self.surveys.get_mut(survey.0) {
            Some(SurveyNode::Real { centrelines, .. }) => centrelines.push(id),
            Some(SurveyNode::Synthetic { name, .. }) => {
                return Err(TherionError::unexpected_state(format!(
                    "synthetic survey \"{name}\" cannot own centrelines"
                )));
            }
            None => return Err(dangling("survey", survey.0)),
        }
        self.centrelines.push(Centreline {
            survey,
            stations: Vec::new(),
        });
        Ok(id)
    }

    /// Adds a station to `centreline`.
    ///
    /// # Errors
    ///
    /// Returns an error if `centreline` is unknown.
    pub fn add_station(
        &mut self,
        centreline: CentrelineId,
        name: impl Into<String>,
    ) -> Result<StationId> {
        let id = StationId(self.stations.len());
        self.centrelines
            .get_mut(centreline.0)
            .ok_or_else(|| dangling("centreline", centreline.0))?
            .stations
            .push(id);
        self.stations.push(Station {
            name: name.into(),
            centreline,
        });
        Ok(id)
    }

    /// Looks up a survey node.
    ///
    /// # Errors
    ///
    /// Returns an error if the id does not belong to this arena.
    pub fn survey(&self, id: SurveyId) -> Result<&SurveyNode> {
        self.surveys.get(id.0).ok_or_else(|| dangling("survey", id.0))
    }

    /// Looks up a centreline.
    ///
    /// # Errors
    ///
    /// Returns an error if the id does not belong to this arena.
    pub fn centreline(&self, id: CentrelineId) -> Result<&Centreline> {
        self.centrelines
            .get(id.0)
            .ok_or_else(|| dangling("centreline", id.0))
    }

    /// Looks up a station.
    ///
    /// # Errors
    ///
    /// Returns an error if the id does not belong to this arena.
    pub fn station(&self, id: StationId) -> Result<&Station> {
        self.stations.get(id.0).ok_or_else(|| dangling("station", id.0))
    }

    /// The survey owning a station's centreline.
    ///
    /// # Errors
    ///
    /// Returns an error if the id does not belong to this arena.
    pub fn station_survey(&self, id: StationId) -> Result<SurveyId> {
        let station = self.station(id)?;
        Ok(self.centreline(station.centreline)?.survey)
    }

    /// First direct child of `parent` named exactly `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if `parent` does not belong to this arena.
    pub fn child_named(&self, parent: SurveyId, name: &str) -> Result<Option<SurveyId>> {
        for &child in self.survey(parent)?.children() {
            if self.survey(child)?.name() == name {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    /// Top-level real surveys, in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = SurveyId> + '_ {
        self.surveys
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.is_synthetic() && node.parent().is_none())
            .map(|(idx, _)| SurveyId(idx))
    }

    /// Finds a real survey by its top-down path of names from a root.
    ///
    /// # Errors
    ///
    /// Returns an error only on a corrupted arena.
    pub fn find_path<S: AsRef<str>>(&self, path: &[S]) -> Result<Option<SurveyId>> {
        let Some((first, rest)) = path.split_first() else {
            return Ok(None);
        };
        let mut current = None;
        for root in self.roots() {
            if self.survey(root)?.name() == first.as_ref() {
                current = Some(root);
                break;
            }
        }
        for name in rest {
            let Some(id) = current else { break };
            current = self.child_named(id, name.as_ref())?;
        }
        Ok(current)
    }

    /// Number of survey nodes, synthetic ones included.
    #[must_use]
    pub fn survey_count(&self) -> usize {
        self.surveys.len()
    }

    /// Number of stations.
    #[must_use]
    pub fn station_count(&self) -> usize {
        self.stations.len()
    }
}

fn dangling(kind: &str, idx: usize) -> TherionError {
    TherionError::unexpected_state(format!("{kind} #{idx} does not belong to this tree"))
}
