//! [`SnapshotStore`], the snapshot implementation of [`RecordStore`].

use std::{
  collections::HashMap,
  path::{Path, PathBuf},
  sync::{Arc, LazyLock, Mutex as SyncMutex, PoisonError, Weak},
};

use booth_core::{
  promo,
  record::{
    Contact, ContactPatch, LoummelSignup, NewContact, NewQrCode, NewSignup,
    NewWheelResult, QrCode, Scan, ScanRequest, Snapshot, WheelResult, email_key,
  },
  store::{ContactQuery, Page, RecordStore},
};
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{Result, file};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Where committed snapshots go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
  /// Kept in process only; cleared on restart.
  Memory,
  /// Rewritten in full to this JSON file on every mutation.
  File(PathBuf),
}

/// A booth record store holding the whole data set as one [`Snapshot`].
///
/// Every mutation runs under a single async mutex. tokio's mutex is fair, so
/// concurrent writers are served first-come first-served, one at a time.
/// A mutation is applied to a copy of the snapshot; the copy replaces the
/// live state only once it has been persisted.
///
/// Cloning is cheap; the inner state is reference-counted.
#[derive(Clone)]
pub struct SnapshotStore {
  inner: Arc<Inner>,
}

struct Inner {
  state:       Mutex<Snapshot>,
  persistence: Persistence,
}

/// Live file-backed stores, keyed by canonical path. Every handle on one file
/// shares one `Inner`, and with it one write queue and one cached snapshot.
static OPEN_FILES: LazyLock<SyncMutex<HashMap<PathBuf, Weak<Inner>>>> =
  LazyLock::new(Default::default);

fn live_inner(path: &Path) -> Option<Arc<Inner>> {
  let files = OPEN_FILES.lock().unwrap_or_else(PoisonError::into_inner);
  files.get(path).and_then(Weak::upgrade)
}

/// Register `inner` for `path`, unless another open won the race, in which
/// case the winner is returned and `inner` is discarded.
fn register(path: PathBuf, inner: Arc<Inner>) -> Arc<Inner> {
  let mut files = OPEN_FILES.lock().unwrap_or_else(PoisonError::into_inner);
  files.retain(|_, weak| weak.strong_count() > 0);
  if let Some(existing) = files.get(&path).and_then(Weak::upgrade) {
    return existing;
  }
  files.insert(path, Arc::downgrade(&inner));
  inner
}

impl SnapshotStore {
  /// Open (or create) a file-backed store at `path`.
  ///
  /// The file is read once per process; a file that does not parse is an
  /// error and is left untouched. Opening a file that is already open (under
  /// any spelling of its path) returns a handle on the same live store.
  pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
    let path = path.into();
    file::ensure_parent(&path).await?;
    let path = file::canonical(&path).await?;

    if let Some(inner) = live_inner(&path) {
      tracing::debug!(path = %path.display(), "reusing open snapshot store");
      return Ok(Self { inner });
    }

    let snapshot = file::load(&path).await?;
    tracing::info!(
      path = %path.display(),
      contacts = snapshot.contacts.len(),
      qr_codes = snapshot.qr_codes.len(),
      scans = snapshot.scans.len(),
      "opened snapshot store"
    );
    let inner = Arc::new(Inner {
      state:       Mutex::new(snapshot),
      persistence: Persistence::File(path.clone()),
    });
    Ok(Self { inner: register(path, inner) })
  }

  /// Open an empty in-memory store. Also what tests use.
  pub fn open_in_memory() -> Self {
    Self {
      inner: Arc::new(Inner {
        state:       Mutex::new(Snapshot::default()),
        persistence: Persistence::Memory,
      }),
    }
  }

  pub fn persistence(&self) -> &Persistence { &self.inner.persistence }

  /// Run `f` against a copy of the snapshot, persist the copy, then commit.
  ///
  /// If `f` or the write fails, the live snapshot is unchanged.
  async fn mutate<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut Snapshot) -> Result<T> + Send,
    T: Send,
  {
    let mut state = self.inner.state.lock().await;
    let mut draft = state.clone();
    let out = f(&mut draft)?;

    if let Persistence::File(path) = &self.inner.persistence {
      file::write_atomic(path, &draft).await?;
    }

    *state = draft;
    Ok(out)
  }

  /// Run `f` against the committed snapshot.
  async fn read<T>(&self, f: impl FnOnce(&Snapshot) -> T) -> T {
    let state = self.inner.state.lock().await;
    f(&state)
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SnapshotStore {
  type Error = crate::Error;

  // ── Contacts ──────────────────────────────────────────────────────────────

  async fn create_contact(&self, input: NewContact) -> Result<Contact> {
    let contact = Contact::from_new(Uuid::new_v4(), input, Utc::now());
    let stored = contact.clone();
    self
      .mutate(move |s| {
        s.contacts.push(stored);
        Ok(())
      })
      .await?;
    Ok(contact)
  }

  async fn list_contacts(&self, query: &ContactQuery) -> Result<Page<Contact>> {
    Ok(self.read(|s| query.apply(&s.contacts)).await)
  }

  async fn get_contact(&self, id: Uuid) -> Result<Option<Contact>> {
    Ok(self.read(|s| s.contacts.iter().find(|c| c.id == id).cloned()).await)
  }

  async fn update_contact(&self, id: Uuid, patch: ContactPatch) -> Result<Contact> {
    self
      .mutate(move |s| {
        let contact = s
          .contacts
          .iter_mut()
          .find(|c| c.id == id)
          .ok_or(booth_core::Error::ContactNotFound(id))?;
        contact.apply(patch, Utc::now());
        Ok(contact.clone())
      })
      .await
  }

  async fn delete_contact(&self, id: Uuid) -> Result<()> {
    self
      .mutate(move |s| {
        let index = s
          .contacts
          .iter()
          .position(|c| c.id == id)
          .ok_or(booth_core::Error::ContactNotFound(id))?;
        s.contacts.remove(index);
        Ok(())
      })
      .await
  }

  // ── QR codes and scans ────────────────────────────────────────────────────

  async fn create_qr_code(&self, input: NewQrCode) -> Result<QrCode> {
    let qr = QrCode {
      id:         Uuid::new_v4(),
      name:       input.name,
      kind:       input.kind,
      url:        input.url,
      scan_count: 0,
      active:     input.active,
      created_at: Utc::now(),
    };
    let stored = qr.clone();
    self
      .mutate(move |s| {
        s.qr_codes.push(stored);
        Ok(())
      })
      .await?;
    Ok(qr)
  }

  async fn list_qr_codes(&self) -> Result<Vec<QrCode>> {
    Ok(self.read(|s| s.qr_codes.clone()).await)
  }

  async fn get_qr_code(&self, id: Uuid) -> Result<Option<QrCode>> {
    Ok(self.read(|s| s.qr_codes.iter().find(|q| q.id == id).cloned()).await)
  }

  async fn set_qr_code_active(&self, id: Uuid, active: bool) -> Result<QrCode> {
    self
      .mutate(move |s| {
        let qr = s
          .qr_codes
          .iter_mut()
          .find(|q| q.id == id)
          .ok_or(booth_core::Error::QrCodeNotFound(id))?;
        qr.active = active;
        Ok(qr.clone())
      })
      .await
  }

  async fn record_scan(&self, qr_code_id: Uuid, request: ScanRequest) -> Result<Scan> {
    self
      .mutate(move |s| {
        let qr = s
          .qr_codes
          .iter_mut()
          .find(|q| q.id == qr_code_id)
          .ok_or(booth_core::Error::QrCodeNotFound(qr_code_id))?;
        if !qr.active {
          return Err(booth_core::Error::QrCodeInactive(qr_code_id).into());
        }
        qr.scan_count += 1;

        let scan = Scan {
          id: Uuid::new_v4(),
          qr_code_id,
          user_agent: request.user_agent,
          address: request.address,
          scanned_at: Utc::now(),
          converted: false,
        };
        s.scans.push(scan.clone());
        Ok(scan)
      })
      .await
  }

  async fn mark_scan_converted(&self, scan_id: Uuid) -> Result<Scan> {
    self
      .mutate(move |s| {
        let scan = s
          .scans
          .iter_mut()
          .find(|sc| sc.id == scan_id)
          .ok_or(booth_core::Error::ScanNotFound(scan_id))?;
        scan.converted = true;
        Ok(scan.clone())
      })
      .await
  }

  async fn list_scans(&self, qr_code_id: Option<Uuid>) -> Result<Vec<Scan>> {
    Ok(
      self
        .read(|s| {
          s.scans
            .iter()
            .filter(|sc| qr_code_id.is_none_or(|id| sc.qr_code_id == id))
            .cloned()
            .collect()
        })
        .await,
    )
  }

  // ── Loummel signups ───────────────────────────────────────────────────────

  async fn create_signup(&self, input: NewSignup) -> Result<LoummelSignup> {
    self
      .mutate(move |s| {
        let key = email_key(&input.email);
        if s.signups.iter().any(|existing| email_key(&existing.email) == key) {
          return Err(booth_core::Error::DuplicateEmail(input.email).into());
        }

        let signup = LoummelSignup {
          id:         Uuid::new_v4(),
          name:       input.name,
          email:      input.email,
          phone:      input.phone,
          promo_code: promo::generate(),
          created_at: Utc::now(),
        };
        s.signups.push(signup.clone());
        Ok(signup)
      })
      .await
  }

  async fn list_signups(&self) -> Result<Vec<LoummelSignup>> {
    Ok(self.read(|s| s.signups.clone()).await)
  }

  // ── Prize wheel ───────────────────────────────────────────────────────────

  async fn record_wheel_result(&self, input: NewWheelResult) -> Result<WheelResult> {
    let result = WheelResult {
      id:         Uuid::new_v4(),
      name:       input.name,
      email:      input.email,
      prize:      input.prize,
      created_at: Utc::now(),
    };
    let stored = result.clone();
    self
      .mutate(move |s| {
        s.wheel_results.push(stored);
        Ok(())
      })
      .await?;
    Ok(result)
  }

  async fn list_wheel_results(&self) -> Result<Vec<WheelResult>> {
    Ok(self.read(|s| s.wheel_results.clone()).await)
  }

  // ── Snapshot ──────────────────────────────────────────────────────────────

  async fn snapshot(&self) -> Result<Snapshot> { Ok(self.read(Snapshot::clone).await) }
}
