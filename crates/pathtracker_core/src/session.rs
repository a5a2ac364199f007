use log::{debug, warn};

use crate::action::{Action, ResolveError};
use crate::campaign::{Campaign, CampaignName};
use crate::command::parse_line;
use crate::engine::{Outcome, Report, dispatch};
use crate::error::CoreError;
use crate::store::CampaignStore;

/// What the read loop should do after a line.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Keep reading. `None` means the line was blank.
    Continue(Option<Report>),
    Quit,
}

/// A loaded campaign together with the store it is saved to.
#[derive(Debug)]
pub struct Session<S> {
    name: CampaignName,
    campaign: Campaign,
    store: S,
}

impl<S: CampaignStore> Session<S> {
    pub fn open(store: S, name: CampaignName) -> Result<Self, CoreError> {
        let campaign = store.load(&name)?;
        Ok(Self {
            name,
            campaign,
            store,
        })
    }

    pub fn name(&self) -> &CampaignName {
        &self.name
    }

    pub fn campaign(&self) -> &Campaign {
        &self.campaign
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn save(&mut self) -> Result<(), CoreError> {
        self.store.save(&self.name, &self.campaign)
    }

    /// Parse, validate and run one input line.
    pub fn execute(&mut self, line: &str) -> Step {
        let raw = match parse_line(line) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Step::Continue(None),
            Err(e) => {
                debug!("parse error on {line:?}: {e}");
                return Step::Continue(Some(Report::ParseFailed(e)));
            }
        };

        let action = match Action::from_raw(&raw) {
            Ok(action) => action,
            Err(ResolveError::Unknown(name)) => {
                return Step::Continue(Some(Report::UnknownCommand(name)));
            }
            Err(ResolveError::Rejected(rejection)) => {
                debug!("rejected {}: {:?}", raw.name, rejection.issues);
                return Step::Continue(Some(Report::Rejected(rejection)));
            }
        };

        match dispatch(action, &mut self.campaign) {
            Outcome::Report(report) => Step::Continue(Some(report)),
            Outcome::Quit => Step::Quit,
            Outcome::Save => {
                let report = match self.save() {
                    Ok(()) => Report::Saved,
                    Err(e) => {
                        warn!("save of campaign '{}' failed: {e}", self.name);
                        Report::SaveFailed(e)
                    }
                };
                Step::Continue(Some(report))
            }
        }
    }
}
