//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: state machine over the presence core
//! - [`Driver`]: platform-specific I/O

use crate::{App, AppAction, AppConfig, Driver};

/// Generic runtime that orchestrates App and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
pub struct Runtime<D>
where
    D: Driver,
{
    driver: D,
    app: App,
}

impl<D> Runtime<D>
where
    D: Driver,
{
    /// Create a new runtime with the given driver and configuration.
    pub fn new(driver: D, config: AppConfig) -> Self {
        Self { driver, app: App::new(config) }
    }

    /// Run the main event loop.
    ///
    /// Renders once, then feeds every polled event through the App and
    /// executes the resulting actions until the driver runs dry or the App
    /// asks to quit.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(&mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;

        let mut processed = 0usize;
        while let Some(event) = self.driver.poll_event().await? {
            processed += 1;
            let actions = self.app.handle(event);
            if self.process_actions(actions)? {
                break;
            }
        }

        tracing::debug!(processed, "event loop finished");
        self.driver.stop();
        Ok(())
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    fn process_actions(&mut self, actions: Vec<AppAction>) -> Result<bool, D::Error> {
        for action in actions {
            match action {
                AppAction::Render => self.driver.render(&self.app)?,
                AppAction::OpenConversation { conversation } => {
                    self.driver.open_conversation(&conversation)?;
                },
                AppAction::Notify { conversation, unread } => {
                    self.driver.notify(&conversation, unread)?;
                },
                AppAction::Quit => return Ok(true),
            }
        }
        Ok(false)
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a mutable reference to the App
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    /// Get a reference to the driver
    pub fn driver(&self) -> &D {
        &self.driver
    }
}
