use crate::api::timer::{Clock, TimerScheduler};
use crate::model::{ScheduleConfig, ScheduleMode};
use crate::processing::pipeline::Pipeline;
use chrono::{DateTime, FixedOffset, Timelike, TimeDelta};
use cron::Schedule;
use futures::future::BoxFuture;
use futures::FutureExt;
use log::{debug, error, info, warn};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// A single timer never sleeps longer, the target is re-checked after each wake.
pub const MAX_TIMER_WAIT: Duration = Duration::from_secs(60 * 60);

/// Supplies the currently configured schedule, read again on every wake.
pub type ScheduleSource = Arc<dyn Fn() -> ScheduleConfig + Send + Sync>;

/// The work done on each scheduled fire.
pub trait UpdateJob: Send + Sync {
    fn run(&self) -> BoxFuture<'_, ()>;
}

impl UpdateJob for Pipeline {
    fn run(&self) -> BoxFuture<'_, ()> {
        async move {
            match self.run_scheduled_update().await {
                Ok(Some(report)) => {
                    if let Some(last_update) = report.last_update {
                        info!("Bouquets updated at {last_update}");
                    }
                }
                Ok(None) => {}
                Err(err) => error!("Scheduled bouquet update failed: {err}"),
            }
        }.boxed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdaterState {
    Idle,
    Armed { wake_at: DateTime<FixedOffset> },
    Firing,
}

fn fixed_time_schedule(schedule: &ScheduleConfig) -> Option<Schedule> {
    let time = schedule.time_of_day()?;
    let expression = format!("0 {} {} * * *", time.minute(), time.hour());
    match Schedule::from_str(&expression) {
        Ok(cron) => Some(cron),
        Err(err) => {
            error!("Invalid fixed time schedule {expression}: {err}");
            None
        }
    }
}

/// Next wake instant for the schedule, strictly after `now`.
pub fn compute_next_wake(schedule: &ScheduleConfig, now: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
    match schedule.mode {
        ScheduleMode::Interval => Some(now + schedule.interval()),
        ScheduleMode::FixedTime => fixed_time_schedule(schedule)?.after(&now).next(),
    }
}

/// Moves a passed target forward by whole periods until it lies after `now`.
pub fn advance_past(target: DateTime<FixedOffset>, now: DateTime<FixedOffset>, period: TimeDelta) -> DateTime<FixedOffset> {
    if target > now || period <= TimeDelta::zero() {
        return target;
    }
    let behind = (now - target).num_seconds();
    let period_secs = period.num_seconds().max(1);
    target + TimeDelta::seconds((behind / period_secs + 1) * period_secs)
}

fn timer_delay(wake_at: DateTime<FixedOffset>, now: DateTime<FixedOffset>) -> Duration {
    (wake_at - now).to_std().unwrap_or(Duration::ZERO).min(MAX_TIMER_WAIT)
}

struct UpdaterInner {
    state: UpdaterState,
    schedule: ScheduleConfig,
    // bumped on every schedule change, older timer callbacks are ignored
    generation: u64,
    cancel: Option<CancellationToken>,
}

/// Re-arming timer that runs the update job on an interval or at a fixed time of day.
#[derive(Clone)]
pub struct ScheduledUpdater {
    inner: Arc<Mutex<UpdaterInner>>,
    timer: Arc<dyn TimerScheduler>,
    clock: Arc<dyn Clock>,
    job: Arc<dyn UpdateJob>,
    schedule_source: Option<ScheduleSource>,
}

impl ScheduledUpdater {
    pub fn new(timer: Arc<dyn TimerScheduler>, clock: Arc<dyn Clock>, job: Arc<dyn UpdateJob>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(UpdaterInner {
                state: UpdaterState::Idle,
                schedule: ScheduleConfig::default(),
                generation: 0,
                cancel: None,
            })),
            timer,
            clock,
            job,
            schedule_source: None,
        }
    }

    pub fn with_schedule_source(mut self, source: ScheduleSource) -> Self {
        self.schedule_source = Some(source);
        self
    }

    /// The configured schedule when it differs from the applied one.
    fn changed_schedule(&self, inner: &UpdaterInner) -> Option<ScheduleConfig> {
        let schedule = (self.schedule_source.as_ref()?)();
        (schedule != inner.schedule).then_some(schedule)
    }

    pub async fn state(&self) -> UpdaterState {
        self.inner.lock().await.state
    }

    fn cancel_pending(inner: &mut UpdaterInner) {
        inner.generation += 1;
        if let Some(token) = inner.cancel.take() {
            token.cancel();
        }
    }

    fn arm(&self, inner: &mut UpdaterInner, wake_at: DateTime<FixedOffset>) {
        let now = self.clock.now();
        let wake_at = advance_past(wake_at, now, inner.schedule.period());
        let delay = timer_delay(wake_at, now);
        let generation = inner.generation;
        let updater = self.clone();
        let token = self.timer.schedule(delay, Box::new(move || {
            async move { updater.on_timer(generation).await }.boxed()
        }));
        inner.cancel = Some(token);
        inner.state = UpdaterState::Armed { wake_at };
        debug!("Next bouquet update at {wake_at}, timer set to {}s", delay.as_secs());
    }

    /// Applies a new schedule at once. A running update is not interrupted,
    /// it re-arms with the new schedule when done.
    pub async fn update_schedule(&self, schedule: &ScheduleConfig) {
        let mut inner = self.inner.lock().await;
        if inner.schedule == *schedule && inner.state != UpdaterState::Idle {
            return;
        }
        self.apply_schedule(&mut inner, schedule);
    }

    fn apply_schedule(&self, inner: &mut UpdaterInner, schedule: &ScheduleConfig) {
        inner.schedule = schedule.clone();
        Self::cancel_pending(inner);

        if !schedule.enabled {
            if inner.state != UpdaterState::Idle {
                info!("Scheduled bouquet update disabled");
            }
            inner.state = UpdaterState::Idle;
            return;
        }
        if inner.state == UpdaterState::Firing {
            return;
        }
        match compute_next_wake(schedule, self.clock.now()) {
            Some(wake_at) => {
                info!("Scheduled bouquet update at {wake_at}");
                self.arm(inner, wake_at);
            }
            None => {
                warn!("Can't compute next wake time, scheduled update stays idle");
                inner.state = UpdaterState::Idle;
            }
        }
    }

    fn on_early_wake(&self, inner: &mut UpdaterInner, wake_at: DateTime<FixedOffset>) {
        if let Some(schedule) = self.changed_schedule(inner) {
            info!("Bouquet update schedule changed");
            self.apply_schedule(inner, &schedule);
            return;
        }
        // the local utc offset can change until a fixed time target is reached
        let target = match inner.schedule.mode {
            ScheduleMode::FixedTime => compute_next_wake(&inner.schedule, self.clock.now()).unwrap_or(wake_at),
            ScheduleMode::Interval => wake_at,
        };
        self.arm(inner, target);
    }

    pub async fn stop(&self) {
        let mut inner = self.inner.lock().await;
        Self::cancel_pending(&mut inner);
        inner.state = UpdaterState::Idle;
    }

    async fn on_timer(&self, generation: u64) {
        let fire_generation = {
            let mut inner = self.inner.lock().await;
            if inner.generation != generation {
                debug!("Ignoring outdated update timer");
                return;
            }
            let UpdaterState::Armed { wake_at } = inner.state else {
                return;
            };
            if self.clock.now() < wake_at {
                self.on_early_wake(&mut inner, wake_at);
                return;
            }
            inner.state = UpdaterState::Firing;
            inner.cancel = None;
            inner.generation
        };

        info!("Running scheduled bouquet update");
        self.job.run().await;

        let mut inner = self.inner.lock().await;
        if inner.state != UpdaterState::Firing {
            return;
        }
        if let Some(schedule) = self.changed_schedule(&inner) {
            inner.schedule = schedule;
            Self::cancel_pending(&mut inner);
        }
        if !inner.schedule.enabled {
            inner.state = UpdaterState::Idle;
            return;
        }
        let now = self.clock.now();
        let next = if inner.generation == fire_generation && inner.schedule.mode == ScheduleMode::Interval {
            Some(now + inner.schedule.interval())
        } else {
            compute_next_wake(&inner.schedule, now)
        };
        match next {
            Some(wake_at) => self.arm(&mut inner, wake_at),
            None => inner.state = UpdaterState::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone};
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use tokio_util::sync::CancellationToken;
    use crate::api::scheduler::{advance_past, compute_next_wake, ScheduleSource, ScheduledUpdater, UpdateJob, UpdaterState, MAX_TIMER_WAIT};
    use crate::api::timer::{Clock, TimerCallback, TimerScheduler};
    use crate::model::{ScheduleConfig, ScheduleMode};

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<FixedOffset> {
        at_offset(1, day, hour, minute)
    }

    fn at_offset(offset_hours: i32, day: u32, hour: u32, minute: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(offset_hours * 3600).unwrap().with_ymd_and_hms(2025, 6, day, hour, minute, 0).unwrap()
    }

    fn interval(minutes: u32) -> ScheduleConfig {
        ScheduleConfig { enabled: true, mode: ScheduleMode::Interval, interval_minutes: minutes, ..ScheduleConfig::default() }
    }

    fn fixed(time: &str) -> ScheduleConfig {
        ScheduleConfig { enabled: true, mode: ScheduleMode::FixedTime, fixed_time: time.to_string(), ..ScheduleConfig::default() }
    }

    struct FakeClock(Mutex<DateTime<FixedOffset>>);

    impl FakeClock {
        fn set(&self, now: DateTime<FixedOffset>) {
            *self.0.lock().unwrap() = now;
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> DateTime<FixedOffset> {
            *self.0.lock().unwrap()
        }
    }

    #[derive(Default)]
    struct RecordingTimer {
        timers: Mutex<Vec<(Duration, Option<TimerCallback>, CancellationToken)>>,
    }

    impl RecordingTimer {
        fn count(&self) -> usize {
            self.timers.lock().unwrap().len()
        }

        fn last_delay(&self) -> Duration {
            self.timers.lock().unwrap().last().unwrap().0
        }

        fn last_cancelled(&self) -> bool {
            self.timers.lock().unwrap().last().unwrap().2.is_cancelled()
        }

        fn take_callback(&self, idx: usize) -> TimerCallback {
            self.timers.lock().unwrap()[idx].1.take().unwrap()
        }
    }

    impl TimerScheduler for RecordingTimer {
        fn schedule(&self, delay: Duration, on_fire: TimerCallback) -> CancellationToken {
            let token = CancellationToken::new();
            self.timers.lock().unwrap().push((delay, Some(on_fire), token.clone()));
            token
        }
    }

    #[derive(Default)]
    struct CountingJob(AtomicUsize);

    impl UpdateJob for CountingJob {
        fn run(&self) -> BoxFuture<'_, ()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(()).boxed()
        }
    }

    fn create_updater(now: DateTime<FixedOffset>) -> (ScheduledUpdater, Arc<RecordingTimer>, Arc<FakeClock>, Arc<CountingJob>) {
        let timer = Arc::new(RecordingTimer::default());
        let clock = Arc::new(FakeClock(Mutex::new(now)));
        let job = Arc::new(CountingJob::default());
        let updater = ScheduledUpdater::new(timer.clone(), clock.clone(), job.clone());
        (updater, timer, clock, job)
    }

    #[test]
    fn test_fixed_time_already_passed_wakes_tomorrow() {
        assert_eq!(compute_next_wake(&fixed("13:00"), at(10, 14, 0)), Some(at(11, 13, 0)));
        assert_eq!(compute_next_wake(&fixed("13:00"), at(10, 12, 0)), Some(at(10, 13, 0)));
    }

    #[test]
    fn test_interval_wake() {
        assert_eq!(compute_next_wake(&interval(30), at(10, 14, 0)), Some(at(10, 14, 30)));
    }

    #[test]
    fn test_advance_past() {
        let period = TimeDelta::minutes(30);
        assert_eq!(advance_past(at(10, 15, 0), at(10, 14, 0), period), at(10, 15, 0));
        assert_eq!(advance_past(at(10, 13, 0), at(10, 14, 10), period), at(10, 14, 30));
        assert_eq!(advance_past(at(10, 14, 0), at(10, 14, 0), period), at(10, 14, 30));
    }

    #[tokio::test]
    async fn test_arm_and_fire() {
        let (updater, timer, clock, job) = create_updater(at(10, 14, 0));
        updater.update_schedule(&interval(30)).await;
        assert_eq!(updater.state().await, UpdaterState::Armed { wake_at: at(10, 14, 30) });
        assert_eq!(timer.last_delay(), Duration::from_secs(30 * 60));

        clock.set(at(10, 14, 30));
        timer.take_callback(0)().await;
        assert_eq!(job.0.load(Ordering::SeqCst), 1);
        assert_eq!(updater.state().await, UpdaterState::Armed { wake_at: at(10, 15, 0) });
        assert_eq!(timer.count(), 2);
    }

    #[tokio::test]
    async fn test_long_wait_is_split() {
        let (updater, timer, clock, job) = create_updater(at(10, 14, 0));
        updater.update_schedule(&fixed("17:00")).await;
        assert_eq!(timer.last_delay(), MAX_TIMER_WAIT);

        clock.set(at(10, 15, 0));
        timer.take_callback(0)().await;
        assert_eq!(job.0.load(Ordering::SeqCst), 0);
        assert_eq!(updater.state().await, UpdaterState::Armed { wake_at: at(10, 17, 0) });
        assert_eq!(timer.count(), 2);
    }

    #[tokio::test]
    async fn test_disable_and_stale_callback() {
        let (updater, timer, clock, job) = create_updater(at(10, 14, 0));
        updater.update_schedule(&interval(30)).await;
        updater.update_schedule(&ScheduleConfig::default()).await;
        assert_eq!(updater.state().await, UpdaterState::Idle);
        assert!(timer.last_cancelled());

        clock.set(at(10, 14, 30));
        timer.take_callback(0)().await;
        assert_eq!(job.0.load(Ordering::SeqCst), 0);
        assert_eq!(updater.state().await, UpdaterState::Idle);
    }

    #[tokio::test]
    async fn test_reschedule_replaces_timer() {
        let (updater, timer, clock, job) = create_updater(at(10, 14, 0));
        updater.update_schedule(&interval(30)).await;
        updater.update_schedule(&fixed("14:45")).await;
        assert_eq!(updater.state().await, UpdaterState::Armed { wake_at: at(10, 14, 45) });

        clock.set(at(10, 14, 45));
        timer.take_callback(0)().await;
        assert_eq!(job.0.load(Ordering::SeqCst), 0);
        timer.take_callback(1)().await;
        assert_eq!(job.0.load(Ordering::SeqCst), 1);
        assert_eq!(updater.state().await, UpdaterState::Armed { wake_at: at(11, 14, 45) });

        updater.stop().await;
        assert_eq!(updater.state().await, UpdaterState::Idle);
        assert!(timer.last_cancelled());
    }

    #[tokio::test]
    async fn test_early_wake_applies_changed_config() {
        let (updater, timer, clock, job) = create_updater(at(10, 14, 0));
        let configured = Arc::new(Mutex::new(fixed("17:00")));
        let source: ScheduleSource = {
            let configured = Arc::clone(&configured);
            Arc::new(move || configured.lock().unwrap().clone())
        };
        let updater = updater.with_schedule_source(source);
        updater.update_schedule(&fixed("17:00")).await;

        *configured.lock().unwrap() = interval(30);
        clock.set(at(10, 15, 0));
        timer.take_callback(0)().await;
        assert_eq!(job.0.load(Ordering::SeqCst), 0);
        assert_eq!(updater.state().await, UpdaterState::Armed { wake_at: at(10, 15, 30) });
        assert_eq!(timer.last_delay(), Duration::from_secs(30 * 60));

        *configured.lock().unwrap() = ScheduleConfig::default();
        clock.set(at(10, 15, 10));
        timer.take_callback(1)().await;
        assert_eq!(updater.state().await, UpdaterState::Idle);
        assert_eq!(timer.count(), 2);
    }

    #[tokio::test]
    async fn test_early_wake_follows_offset_change() {
        let (updater, timer, clock, _job) = create_updater(at_offset(1, 10, 14, 0));
        updater.update_schedule(&fixed("17:00")).await;

        clock.set(at_offset(2, 10, 16, 0));
        timer.take_callback(0)().await;
        let UpdaterState::Armed { wake_at } = updater.state().await else {
            panic!("updater not armed");
        };
        assert_eq!(wake_at, at_offset(2, 10, 17, 0));
        assert_eq!(wake_at.offset().local_minus_utc(), 7200);
    }
}
