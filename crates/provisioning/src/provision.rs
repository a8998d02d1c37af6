//! Idempotent provisioning of teams, invitations, repositories and
//! permissions.
//!
//! [`Provisioner::run`] drives four stages strictly in order:
//!
//! 1. **Teams**: find-or-create the admin team and one `Team<N>` per team
//!    number in scope, producing a [`TeamDirectory`].
//! 2. **Invitations**: one organization invitation per roster row, carrying
//!    the row's team and the admin team.
//! 3. **Repositories**: find-or-create `Team<N>_BE` and `Team<N>_FE`.
//! 4. **Permissions**: bind each team with `push` and the admin team with
//!    `admin` on both of its repositories.
//!
//! Nothing is rolled back. A failure inside a stage is a warning for that
//! unit of work and the stage moves on; every later stage still runs.
//! Running the whole process again converges on the intended state because
//! every step looks before it creates or is itself a replace.

use std::collections::BTreeMap;

use tracing::{debug, info, info_span, warn, Instrument};

use crate::{
    EmailAddress, GithubError, Invitation, OrgRole, OrganizationAdmin, PermissionLevel,
    ProvisionConfig, ProvisionError, RepositoryFlavor, RepositoryName, Roster, RosterRow,
    RunReport, Stage, Team, TeamId, TeamName, TeamNumber, TeamSlug,
};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// How [`Provisioner::ensure_team`] resolved a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamOutcome {
    /// The team already existed.
    Found(Team),
    /// The team was created by this call.
    Created(Team),
    /// Creation failed but the team turned up on the follow-up lookup,
    /// typically because something else created it in between.
    Recovered(Team),
}

impl TeamOutcome {
    pub fn into_team(self) -> Team {
        match self {
            Self::Found(team) | Self::Created(team) | Self::Recovered(team) => team,
        }
    }
}

/// How [`Provisioner::ensure_repo`] resolved a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryOutcome {
    Existing,
    Created,
}

// ---------------------------------------------------------------------------
// Team directory
// ---------------------------------------------------------------------------

/// Teams resolved in the team stage, read by every later stage.
///
/// A team number missing from the directory means its team could not be
/// resolved; later stages skip work that needs it with a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamDirectory {
    admin: Team,
    teams: BTreeMap<TeamNumber, Team>,
}

impl TeamDirectory {
    pub fn new(admin: Team) -> Self {
        Self {
            admin,
            teams: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, number: TeamNumber, team: Team) {
        self.teams.insert(number, team);
    }

    pub fn admin(&self) -> &Team {
        &self.admin
    }

    pub fn get(&self, number: TeamNumber) -> Option<&Team> {
        self.teams.get(&number)
    }
}

// ---------------------------------------------------------------------------
// Provisioner
// ---------------------------------------------------------------------------

/// Runs provisioning against an [`OrganizationAdmin`].
///
/// The executor decides whether mutations really happen: pass a live client
/// for a real run, or a [`crate::DryRunAdmin`] to only log them.
pub struct Provisioner<'a, A: ?Sized> {
    api: &'a A,
    config: &'a ProvisionConfig,
}

impl<'a, A: OrganizationAdmin + ?Sized> Provisioner<'a, A> {
    pub fn new(api: &'a A, config: &'a ProvisionConfig) -> Self {
        Self { api, config }
    }

    /// Finds the team called `name`, creating it if it does not exist.
    ///
    /// On a failed create the team is looked up once more before giving up,
    /// so a team that appeared in the meantime is still returned.
    ///
    /// # Errors
    ///
    /// The lookup error if the first lookup fails, otherwise the create error
    /// if the team still cannot be found after a failed create.
    #[tracing::instrument(skip(self), fields(org = %self.config.org))]
    pub async fn ensure_team(&self, name: &TeamName) -> Result<TeamOutcome, GithubError> {
        let org = &self.config.org;
        if let Some(team) = self.api.find_team_by_name(org, name).await? {
            debug!(slug = %team.slug, id = %team.id, "Team already exists");
            return Ok(TeamOutcome::Found(team));
        }

        let create_err = match self
            .api
            .create_team(org, name, self.config.team_privacy)
            .await
        {
            Ok(team) => {
                info!(slug = %team.slug, id = %team.id, "Created team");
                return Ok(TeamOutcome::Created(team));
            }
            Err(err) => err,
        };

        warn!(error = %create_err, "Team creation failed; looking it up again");
        match self.api.find_team_by_name(org, name).await {
            Ok(Some(team)) => {
                warn!(slug = %team.slug, id = %team.id, "Team exists despite failed creation");
                Ok(TeamOutcome::Recovered(team))
            }
            Ok(None) => Err(create_err),
            Err(lookup_err) => {
                warn!(error = %lookup_err, "Follow-up team lookup failed");
                Err(create_err)
            }
        }
    }

    /// Creates the public repository `repo` unless it already exists.
    #[tracing::instrument(skip(self), fields(org = %self.config.org))]
    pub async fn ensure_repo(&self, repo: &RepositoryName) -> Result<RepositoryOutcome, GithubError> {
        let org = &self.config.org;
        if self.api.repository_exists(org, repo).await? {
            debug!("Repository already exists");
            return Ok(RepositoryOutcome::Existing);
        }
        self.api.create_repository(org, repo).await?;
        info!("Created repository");
        Ok(RepositoryOutcome::Created)
    }

    /// Sets `team`'s permission on `repo` to `level`.
    #[tracing::instrument(skip(self), fields(org = %self.config.org))]
    pub async fn grant(
        &self,
        team: &TeamSlug,
        repo: &RepositoryName,
        level: PermissionLevel,
    ) -> Result<(), GithubError> {
        self.api
            .grant_team_permission(&self.config.org, team, repo, level)
            .await?;
        debug!("Granted permission");
        Ok(())
    }

    /// Invites `email` into the organization and into every team in `team_ids`.
    #[tracing::instrument(skip(self), fields(org = %self.config.org))]
    pub async fn invite(
        &self,
        email: &EmailAddress,
        role: OrgRole,
        team_ids: &[TeamId],
    ) -> Result<(), GithubError> {
        let invitation = Invitation {
            email: email.clone(),
            role,
            team_ids: team_ids.to_vec(),
        };
        self.api
            .create_invitation(&self.config.org, &invitation)
            .await?;
        info!("Sent invitation");
        Ok(())
    }

    /// Runs every stage for `roster`.
    ///
    /// # Errors
    ///
    /// - [`ProvisionError::OrganizationUnavailable`] if the preflight check
    ///   fails.
    /// - [`ProvisionError::AdminTeamUnresolved`] if the admin team can be
    ///   neither found nor created.
    ///
    /// Every other failure is recorded in the returned [`RunReport`].
    pub async fn run(&self, roster: &Roster) -> Result<RunReport, ProvisionError> {
        let span = info_span!(
            "provision",
            org = %self.config.org,
            dry_run = self.config.dry_run,
            roster = %roster.source().display(),
        );
        self.run_stages(roster).instrument(span).await
    }

    async fn run_stages(&self, roster: &Roster) -> Result<RunReport, ProvisionError> {
        let mut report = RunReport::new(self.config.dry_run);

        self.api
            .verify_organization(&self.config.org)
            .await
            .map_err(|source| ProvisionError::OrganizationUnavailable {
                org: self.config.org.clone(),
                source,
            })?;

        let rows = self.rows_in_scope(roster, &mut report);
        let numbers = self
            .config
            .scope
            .team_numbers(rows.iter().map(|row| row.team));
        info!(
            teams = numbers.len(),
            members = rows.len(),
            scope = ?self.config.scope,
            "Provisioning plan ready"
        );

        let directory = self
            .provision_teams(&numbers, &mut report)
            .instrument(info_span!("teams"))
            .await?;
        self.invite_members(&rows, &directory, &mut report)
            .instrument(info_span!("invitations"))
            .await;
        self.provision_repositories(&numbers, &mut report)
            .instrument(info_span!("repositories"))
            .await;
        self.bind_permissions(&numbers, &directory, &mut report)
            .instrument(info_span!("permissions"))
            .await;

        info!(
            teams_created = report.teams_created,
            repositories_created = report.repositories_created,
            invitations_sent = report.invitations_sent,
            grants_applied = report.grants_applied,
            warnings = report.warnings.len(),
            "Provisioning finished"
        );
        Ok(report)
    }

    fn rows_in_scope<'r>(&self, roster: &'r Roster, report: &mut RunReport) -> Vec<&'r RosterRow> {
        report.rows_skipped = roster.skipped().len();
        report
            .warnings
            .extend(roster.skipped().iter().map(|skipped| crate::Warning {
                stage: Stage::Roster,
                subject: format!("line {}", skipped.line),
                message: skipped.reason.to_string(),
            }));

        let scope = self.config.scope;
        roster
            .rows()
            .iter()
            .filter(|row| {
                if scope.contains(row.team) {
                    return true;
                }
                report.rows_skipped += 1;
                report.warn(
                    Stage::Roster,
                    format!("line {}", row.line),
                    format!("team {} is outside the configured range", row.team),
                );
                false
            })
            .collect()
    }

    async fn provision_teams(
        &self,
        numbers: &[TeamNumber],
        report: &mut RunReport,
    ) -> Result<TeamDirectory, ProvisionError> {
        let admin_name = &self.config.admin_team;
        let admin = match self.ensure_team(admin_name).await {
            Ok(outcome) => {
                self.count_team(&outcome, report);
                outcome.into_team()
            }
            Err(source) => {
                return Err(ProvisionError::AdminTeamUnresolved {
                    name: admin_name.clone(),
                    source,
                })
            }
        };

        let mut directory = TeamDirectory::new(admin);
        for &number in numbers {
            let name = number.team_name();
            match self.ensure_team(&name).await {
                Ok(outcome) => {
                    self.count_team(&outcome, report);
                    directory.insert(number, outcome.into_team());
                }
                Err(err) => {
                    report.teams_failed += 1;
                    report.warn(Stage::Teams, name.as_str(), format!("team could not be resolved: {err}"));
                }
            }
        }
        Ok(directory)
    }

    fn count_team(&self, outcome: &TeamOutcome, report: &mut RunReport) {
        match outcome {
            TeamOutcome::Created(_) => report.teams_created += 1,
            TeamOutcome::Found(_) => report.teams_found += 1,
            TeamOutcome::Recovered(team) => {
                report.teams_found += 1;
                report.warn(
                    Stage::Teams,
                    team.name.as_str(),
                    "creation failed but the team exists; using it",
                );
            }
        }
    }

    async fn invite_members(
        &self,
        rows: &[&RosterRow],
        directory: &TeamDirectory,
        report: &mut RunReport,
    ) {
        let admin_id = directory.admin().id;
        for row in rows {
            let Some(team) = directory.get(row.team) else {
                report.invitations_skipped += 1;
                report.warn(
                    Stage::Invitations,
                    row.email.as_str(),
                    format!("team {} was not resolved; invitation not sent", row.team),
                );
                continue;
            };

            match self
                .invite(&row.email, self.config.invite_role, &[team.id, admin_id])
                .await
            {
                Ok(()) => report.invitations_sent += 1,
                Err(err) => {
                    report.invitations_failed += 1;
                    report.warn(
                        Stage::Invitations,
                        row.email.as_str(),
                        format!("invitation failed (already invited or a member?): {err}"),
                    );
                }
            }
        }
    }

    async fn provision_repositories(&self, numbers: &[TeamNumber], report: &mut RunReport) {
        for &number in numbers {
            for flavor in RepositoryFlavor::ALL {
                let repo = number.repository(flavor);
                match self.ensure_repo(&repo).await {
                    Ok(RepositoryOutcome::Existing) => report.repositories_existing += 1,
                    Ok(RepositoryOutcome::Created) => report.repositories_created += 1,
                    Err(err) => {
                        report.repositories_failed += 1;
                        report.warn(
                            Stage::Repositories,
                            repo.full_name(&self.config.org),
                            format!("repository could not be provisioned: {err}"),
                        );
                    }
                }
            }
        }
    }

    async fn bind_permissions(
        &self,
        numbers: &[TeamNumber],
        directory: &TeamDirectory,
        report: &mut RunReport,
    ) {
        let admin_slug = &directory.admin().slug;
        for &number in numbers {
            let team_slug = directory.get(number).map(|team| &team.slug);
            for flavor in RepositoryFlavor::ALL {
                let repo = number.repository(flavor);
                match team_slug {
                    Some(slug) => self.bind(slug, &repo, PermissionLevel::Push, report).await,
                    None => {
                        report.grants_skipped += 1;
                        report.warn(
                            Stage::Permissions,
                            repo.full_name(&self.config.org),
                            format!("no identifier for {}; push grant skipped", number.team_name()),
                        );
                    }
                }
                self.bind(admin_slug, &repo, PermissionLevel::Admin, report)
                    .await;
            }
        }
    }

    async fn bind(
        &self,
        slug: &TeamSlug,
        repo: &RepositoryName,
        level: PermissionLevel,
        report: &mut RunReport,
    ) {
        match self.grant(slug, repo, level).await {
            Ok(()) => report.grants_applied += 1,
            Err(err) => {
                report.grants_failed += 1;
                report.warn(
                    Stage::Permissions,
                    repo.full_name(&self.config.org),
                    format!("granting {level} to team '{slug}' failed: {err}"),
                );
            }
        }
    }
}
