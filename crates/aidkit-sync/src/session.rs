//! [`SessionManager`] — credential lifecycle and the live session value.
//!
//! Exactly one session is active per client. Every sign-in, sign-out and
//! account creation runs under one async lock, so the primary session record
//! and the published [`Session`] never disagree. Each transition is broadcast
//! to every [`SessionChanges`] subscriber.

use std::sync::Arc;

use aidkit_core::{
  Error, Result,
  federated::FederatedProvider,
  profile::NewProfile,
  session::{Account, FederatedIdentity, OriginProvider, Session, SessionToken},
  store::{CredentialStore, ProfileStore},
};
use tokio::sync::{Mutex, broadcast};
use uuid::Uuid;

use crate::config::SyncConfig;

/// The session currently held, with its primary-credential record.
struct Active {
  token:   SessionToken,
  session: Session,
}

pub struct SessionManager<C, P, F> {
  credentials: Arc<C>,
  profiles:    Arc<P>,
  federated:   Arc<F>,
  active:      Mutex<Option<Active>>,
  changes:     broadcast::Sender<Option<Session>>,
}

impl<C, P, F> SessionManager<C, P, F>
where
  C: CredentialStore,
  P: ProfileStore,
  F: FederatedProvider,
{
  pub fn new(
    credentials: Arc<C>,
    profiles: Arc<P>,
    federated: Arc<F>,
    config: &SyncConfig,
  ) -> Self {
    let (changes, _) = broadcast::channel(config.session_buffer.max(1));
    Self {
      credentials,
      profiles,
      federated,
      active: Mutex::new(None),
      changes,
    }
  }

  // ── Sign-in ───────────────────────────────────────────────────────────────

  /// Create a password account and its (non-privileged) profile, then sign
  /// in as it.
  ///
  /// If the profile write fails the credential is removed again and the
  /// profile failure is returned. If that removal also fails the result is
  /// [`Error::CredentialOnly`]. No session is established in either case.
  pub async fn create_account(
    &self,
    email: &str,
    password: &str,
    name: &str,
    phone: &str,
  ) -> Result<Session> {
    let mut active = self.active.lock().await;

    let account = self
      .credentials
      .create_credential(email, password)
      .await
      .map_err(Into::<Error>::into)?;

    let profile = NewProfile {
      identity_id: account.identity_id,
      name:        name.to_owned(),
      email:       account.email.clone(),
      phone:       phone.to_owned(),
    };
    if let Err(e) = self.profiles.create_profile(profile).await {
      return Err(self.compensate(account.identity_id, e.into()).await);
    }

    tracing::info!(identity_id = %account.identity_id, "account created");
    self.establish(&mut active, account).await
  }

  /// Sign in with an email and password. Reads no profile.
  pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
    let mut active = self.active.lock().await;

    let account = self
      .credentials
      .verify_password(email, password)
      .await
      .map_err(Into::<Error>::into)?;

    self.establish(&mut active, account).await
  }

  /// Sign in through the federated provider, creating the identity's profile
  /// on its first sign-in.
  pub async fn sign_in_with_federated_provider(&self) -> Result<Session> {
    let mut active = self.active.lock().await;

    let identity = self.federated.authenticate().await?;

    let account = match self.credentials.link_federated(&identity).await {
      Ok(account) => account,
      Err(e) => {
        // Don't leave the provider signed in to an identity we rejected.
        if let Err(e) = self.federated.sign_out().await {
          tracing::warn!("provider sign-out after failed link: {e}");
        }
        return Err(e.into());
      }
    };

    self.bootstrap_profile(&account, &identity).await;
    self.establish(&mut active, account).await
  }

  // ── Sign-out ──────────────────────────────────────────────────────────────

  /// End both the provider session and the primary session, then publish
  /// the absent session. Either half failing is logged and never stops the
  /// other half.
  pub async fn sign_out(&self) {
    let mut active = self.active.lock().await;

    if let Err(e) = self.federated.sign_out().await {
      tracing::warn!("federated sign-out failed: {e}");
    }

    if let Some(previous) = active.take() {
      self.revoke(previous.token).await;
      tracing::info!(identity_id = %previous.session.identity_id, "signed out");
    }

    self.notify(None);
  }

  // ── Observation ───────────────────────────────────────────────────────────

  /// Snapshot of the active session. Waits for a sign-in or sign-out in
  /// progress to finish.
  pub async fn current_session(&self) -> Option<Session> {
    self.active.lock().await.as_ref().map(|a| a.session.clone())
  }

  /// Live session values: the current one first, then every transition.
  pub async fn session_changes(&self) -> SessionChanges {
    // Under the lock no transition can fall between the read and the
    // subscription.
    let active = self.active.lock().await;
    SessionChanges {
      initial: Some(active.as_ref().map(|a| a.session.clone())),
      rx:      self.changes.subscribe(),
    }
  }

  // ── Internals ─────────────────────────────────────────────────────────────

  /// Replace whatever session is held with one for `account` and publish it.
  async fn establish(&self, active: &mut Option<Active>, account: Account) -> Result<Session> {
    let identity_id = account.identity_id;
    let session = Session::from(account);

    if let Some(previous) = active.take() {
      self.revoke(previous.token).await;
      let was_federated = matches!(
        previous.session.origin_provider,
        OriginProvider::Federated { .. }
      );
      let is_federated = matches!(session.origin_provider, OriginProvider::Federated { .. });
      if was_federated && !is_federated {
        if let Err(e) = self.federated.sign_out().await {
          tracing::warn!("federated sign-out of replaced session failed: {e}");
        }
      }
      // Subscribers see the old identity leave even if opening the new
      // session fails below.
      self.notify(None);
    }

    let token = self
      .credentials
      .open_session(identity_id)
      .await
      .map_err(Into::<Error>::into)?;

    tracing::info!(%identity_id, origin = ?session.origin_provider, "signed in");
    *active = Some(Active {
      token,
      session: session.clone(),
    });
    self.notify(Some(session.clone()));
    Ok(session)
  }

  fn notify(&self, session: Option<Session>) {
    if self.changes.send(session).is_err() {
      tracing::trace!("no session subscribers");
    }
  }

  async fn revoke(&self, token: SessionToken) {
    if let Err(e) = self.credentials.revoke_session(token).await {
      let e: Error = e.into();
      tracing::warn!("primary session revocation failed: {e}");
    }
  }

  /// Create the profile for a federated identity that has none yet. Failures
  /// are logged: the session still proceeds, role resolution fails closed,
  /// and the next federated sign-in retries.
  async fn bootstrap_profile(&self, account: &Account, identity: &FederatedIdentity) {
    match self.profiles.get_profile(account.identity_id).await {
      Ok(Some(_)) => {}
      Ok(None) => {
        let profile = NewProfile {
          identity_id: account.identity_id,
          name:        identity.display_name.clone().unwrap_or_default(),
          email:       identity.email.clone(),
          phone:       String::new(),
        };
        match self.profiles.create_profile(profile).await.map_err(Into::<Error>::into) {
          Ok(_) => {
            tracing::info!(identity_id = %account.identity_id, "created profile for federated identity");
          }
          // Another client created it in the meantime.
          Err(Error::AccountExists) => {}
          Err(e) => tracing::warn!("federated profile bootstrap failed: {e}"),
        }
      }
      Err(e) => {
        let e: Error = e.into();
        tracing::warn!("federated profile lookup failed: {e}");
      }
    }
  }

  /// Undo a credential whose profile could not be written.
  async fn compensate(&self, identity_id: Uuid, cause: Error) -> Error {
    match self.credentials.remove_credential(identity_id).await {
      Ok(()) => {
        tracing::warn!(%identity_id, "profile write failed, credential removed: {cause}");
        cause
      }
      Err(e) => {
        let e: Error = e.into();
        tracing::warn!(
          %identity_id,
          "profile write failed ({cause}) and credential removal failed: {e}"
        );
        Error::CredentialOnly { identity_id }
      }
    }
  }
}

// ─── Change stream ───────────────────────────────────────────────────────────

/// Push-based sequence of session values. Dropping it unsubscribes.
pub struct SessionChanges {
  initial: Option<Option<Session>>,
  rx:      broadcast::Receiver<Option<Session>>,
}

impl SessionChanges {
  /// The next session value. The first call yields the value current at
  /// subscription time; later calls wait for the next transition. A
  /// subscriber more than `session_buffer` transitions behind skips to the
  /// oldest one still buffered. Returns `None` once the [`SessionManager`]
  /// is gone.
  pub async fn next(&mut self) -> Option<Option<Session>> {
    if let Some(initial) = self.initial.take() {
      return Some(initial);
    }
    loop {
      match self.rx.recv().await {
        Ok(session) => return Some(session),
        Err(broadcast::error::RecvError::Lagged(skipped)) => {
          tracing::debug!(skipped, "session subscriber lagged");
        }
        Err(broadcast::error::RecvError::Closed) => return None,
      }
    }
  }
}
