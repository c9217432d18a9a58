use chrono::{DateTime, Duration, Utc};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::database::models::*;
use crate::services::notifications::NotificationService;

/// Minutes between two reminder checks; must match `CHECK_SCHEDULE`.
pub const CHECK_INTERVAL_MINUTES: i64 = 5;
const CHECK_SCHEDULE: &str = "0 */5 * * * *";

/// Sends "starts soon" reminders for upcoming speeches on a cron schedule.
pub struct ReminderService {
    notifications: NotificationService,
    lead: Duration,
    scheduler: JobScheduler,
}

impl ReminderService {
    pub async fn new(
        notifications: NotificationService,
        lead_minutes: i64,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            notifications,
            lead: Duration::minutes(lead_minutes),
            scheduler,
        })
    }

    pub async fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let notifications = self.notifications.clone();
        let lead = self.lead;

        let reminder_job = Job::new_async(CHECK_SCHEDULE, move |_uuid, _l| {
            let notifications = notifications.clone();
            Box::pin(async move {
                match send_due_reminders(&notifications, Utc::now(), lead).await {
                    Ok(0) => {}
                    Ok(count) => tracing::info!("Sent reminders for {} speeches", count),
                    Err(e) => tracing::error!("Failed to send reminders: {}", e),
                }
            })
        })?;

        self.scheduler.add(reminder_job).await?;
        self.scheduler.start().await?;

        if self.lead < Duration::minutes(CHECK_INTERVAL_MINUTES) {
            tracing::warn!(
                "Reminder lead of {} minutes is shorter than the check interval - reminders go out up to {} minutes ahead",
                self.lead.num_minutes(),
                CHECK_INTERVAL_MINUTES
            );
        }
        tracing::info!(
            "Reminder service started - checking every {} minutes, {} minutes ahead",
            CHECK_INTERVAL_MINUTES,
            self.lead.num_minutes()
        );
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.scheduler.shutdown().await?;
        Ok(())
    }

    pub async fn check_reminders_now(&self) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        send_due_reminders(&self.notifications, Utc::now(), self.lead).await
    }
}

/// Reminds subscribers about every speech starting in `(now, now + horizon]`
/// that has not been reminded about yet. Returns the number of speeches
/// a reminder was sent for.
pub async fn send_due_reminders(
    notifications: &NotificationService,
    now: DateTime<Utc>,
    lead: Duration,
) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
    let pool = notifications.pool();
    let upcoming = SpeechDetails::starting_between(pool, now, now + reminder_horizon(lead)).await?;

    let mut reminded = 0;
    for speech in upcoming {
        if Notification::exists_for_speech(pool, speech.id, NotificationKind::Reminder).await? {
            continue;
        }

        let Some(event) = Event::find_by_id(pool, speech.event_id).await? else {
            continue;
        };

        let sent = notifications
            .send_reminder_notification(&event, Some(&speech))
            .await?;
        tracing::debug!(
            "Reminder for speech {} ('{}') delivered to {} subscribers",
            speech.id,
            speech.title,
            sent
        );
        reminded += 1;
    }

    Ok(reminded)
}

/// How far ahead one check looks. Consecutive checks must cover every start
/// time, so the horizon never drops below the check interval.
pub fn reminder_horizon(lead: Duration) -> Duration {
    lead.max(Duration::minutes(CHECK_INTERVAL_MINUTES))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizon_covers_check_interval() {
        assert_eq!(reminder_horizon(Duration::minutes(1)), Duration::minutes(5));
        assert_eq!(reminder_horizon(Duration::minutes(15)), Duration::minutes(15));
    }
}
