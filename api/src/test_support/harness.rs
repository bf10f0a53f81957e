use crate::configuration::{Settings, SharedSettings};
use crate::test_support::database::reset_database;
use crate::test_support::test_app::{spawn_test_app_with_settings, TestApp};

/// Scoped settings changes with guaranteed restoration.
///
/// Snapshots the shared settings on acquisition, applies the caller's
/// changes, and puts the snapshot back exactly when dropped, so settings
/// changed by one test class never leak into the next.
pub struct SettingsGuard {
    shared: SharedSettings,
    snapshot: Settings,
}

impl SettingsGuard {
    pub fn apply(shared: &SharedSettings, changes: impl FnOnce(&mut Settings)) -> Self {
        let mut settings = shared.write().expect("settings lock poisoned");
        let snapshot = settings.clone();
        changes(&mut settings);
        drop(settings);

        Self {
            shared: shared.clone(),
            snapshot,
        }
    }

    /// A copy of the settings as they currently stand, changes included.
    pub fn current(&self) -> Settings {
        self.shared
            .read()
            .expect("settings lock poisoned")
            .clone()
    }
}

impl Drop for SettingsGuard {
    fn drop(&mut self) {
        *self.shared.write().expect("settings lock poisoned") = self.snapshot.clone();
    }
}

/// Scaffold for functional test classes.
///
/// On start it applies the test's settings changes under a [`SettingsGuard`]
/// and spawns a [`TestApp`]; between tests, [`reset_database`] gives each one
/// a clean slate; when dropped, the app goes down first and the guard then
/// restores the settings snapshot.
pub struct FunctionalTestHarness {
    pub app: TestApp,
    _settings: SettingsGuard,
}

impl FunctionalTestHarness {
    pub async fn start(
        shared: &SharedSettings,
        changes: impl FnOnce(&mut Settings),
    ) -> FunctionalTestHarness {
        let guard = SettingsGuard::apply(shared, changes);
        let app = spawn_test_app_with_settings(guard.current()).await;

        FunctionalTestHarness {
            app,
            _settings: guard,
        }
    }

    /// Call at the top of every test that touches the database.
    pub async fn reset_database(&self) {
        reset_database(self.app.pool()).await;
    }
}
