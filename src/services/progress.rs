//! Course-progress computation and lesson-completion state transitions.
//!
//! The tracker records that a lesson is complete for a student's enrollment,
//! then recomputes the enrollment's aggregate percentage from the live content
//! of the course. Marking an already-completed lesson is a no-op for the
//! per-lesson row, so the whole operation is safe to retry after a partial
//! failure.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("student {student_id} is not enrolled in course {course_id}")]
    NotEnrolled { student_id: Uuid, course_id: Uuid },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Enrollment fields the tracker needs to read and update
#[derive(Debug, Clone)]
pub struct EnrollmentRecord {
    pub id: Uuid,
    pub progress_percentage: i32,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Per-lesson completion row as seen by the tracker
#[derive(Debug, Clone)]
pub struct LessonProgressRecord {
    pub id: Uuid,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Result of a completion event: the enrollment's recomputed aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentProgress {
    pub enrollment_id: Uuid,
    pub progress_percentage: i32,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_lessons: i64,
    pub total_lessons: i64,
}

/// Completion state for one (enrollment, lesson) pair. A missing row reads as
/// the default "not started" state, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonCompletionState {
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Default for LessonCompletionState {
    fn default() -> Self {
        Self {
            completed: false,
            completed_at: None,
        }
    }
}

#[async_trait]
pub trait EnrollmentStore {
    async fn find_enrollment(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<EnrollmentRecord>, StoreError>;

    async fn update_enrollment_progress(
        &self,
        enrollment_id: Uuid,
        progress_percentage: i32,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ContentStore {
    /// All lesson ids belonging to any module of the course (module -> lesson join)
    async fn lesson_ids_for_course(&self, course_id: Uuid) -> Result<Vec<Uuid>, StoreError>;

    async fn find_lesson_progress(
        &self,
        enrollment_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<Option<LessonProgressRecord>, StoreError>;

    async fn insert_lesson_progress(
        &self,
        enrollment_id: Uuid,
        lesson_id: Uuid,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError>;

    async fn update_lesson_progress(
        &self,
        progress_id: Uuid,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError>;

    async fn count_completed_lessons(&self, enrollment_id: Uuid) -> Result<i64, StoreError>;
}

/// Aggregate percentage: round(completed / total * 100), half-up, 0 when the
/// course has no lessons
pub fn progress_percentage(completed_lessons: i64, total_lessons: i64) -> i32 {
    if total_lessons <= 0 {
        return 0;
    }
    ((completed_lessons as f64 / total_lessons as f64) * 100.0).round() as i32
}

pub struct ProgressTracker<E, C> {
    enrollments: E,
    content: C,
}

impl<E, C> ProgressTracker<E, C>
where
    E: EnrollmentStore + Send + Sync,
    C: ContentStore + Send + Sync,
{
    pub fn new(enrollments: E, content: C) -> Self {
        Self {
            enrollments,
            content,
        }
    }

    /// Durably record that a lesson is complete for the student's enrollment
    /// and recompute the enrollment's aggregate percentage.
    ///
    /// Fails with [`ProgressError::NotEnrolled`] before any write when no
    /// enrollment exists; enrolling is the caller's responsibility. Marking a
    /// lesson that is already complete does not touch its `completed_at` and
    /// does not double-count, so repeated calls return the same result.
    pub async fn mark_lesson_complete(
        &self,
        student_id: Uuid,
        course_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<EnrollmentProgress, ProgressError> {
        self.mark_lesson_complete_at(student_id, course_id, lesson_id, Utc::now())
            .await
    }

    /// Same as [`mark_lesson_complete`](Self::mark_lesson_complete) with an
    /// explicit completion timestamp
    pub async fn mark_lesson_complete_at(
        &self,
        student_id: Uuid,
        course_id: Uuid,
        lesson_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<EnrollmentProgress, ProgressError> {
        let enrollment = self
            .enrollments
            .find_enrollment(student_id, course_id)
            .await?
            .ok_or(ProgressError::NotEnrolled {
                student_id,
                course_id,
            })?;

        // Lookup-then-insert-or-update; never a duplicate row
        match self
            .content
            .find_lesson_progress(enrollment.id, lesson_id)
            .await?
        {
            None => {
                self.content
                    .insert_lesson_progress(enrollment.id, lesson_id, true, Some(now))
                    .await?;
            }
            Some(existing) if !existing.completed => {
                self.content
                    .update_lesson_progress(existing.id, true, Some(now))
                    .await?;
            }
            // Already complete: idempotent, leave completed_at alone
            Some(_) => {}
        }

        let total_lessons = self.content.lesson_ids_for_course(course_id).await?.len() as i64;
        let completed_lessons = self.content.count_completed_lessons(enrollment.id).await?;

        let percentage = progress_percentage(completed_lessons, total_lessons);
        let completed_at = if percentage == 100 { Some(now) } else { None };

        self.enrollments
            .update_enrollment_progress(enrollment.id, percentage, completed_at)
            .await?;

        tracing::debug!(
            enrollment_id = %enrollment.id,
            %lesson_id,
            completed_lessons,
            total_lessons,
            percentage,
            "recorded lesson completion"
        );

        Ok(EnrollmentProgress {
            enrollment_id: enrollment.id,
            progress_percentage: percentage,
            completed_at,
            completed_lessons,
            total_lessons,
        })
    }

    /// Pure read of a lesson's completion state for an enrollment
    pub async fn get_progress(
        &self,
        enrollment_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<LessonCompletionState, ProgressError> {
        let state = self
            .content
            .find_lesson_progress(enrollment_id, lesson_id)
            .await?
            .map(|row| LessonCompletionState {
                completed: row.completed,
                completed_at: row.completed_at,
            })
            .unwrap_or_default();

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct InMemoryEnrollments {
        // (student_id, course_id) -> record
        rows: Mutex<HashMap<(Uuid, Uuid), EnrollmentRecord>>,
        writes: AtomicUsize,
    }

    impl InMemoryEnrollments {
        fn new() -> Self {
            Self {
                rows: Mutex::new(HashMap::new()),
                writes: AtomicUsize::new(0),
            }
        }

        fn enroll(&self, student_id: Uuid, course_id: Uuid) -> Uuid {
            let id = Uuid::new_v4();
            self.rows.lock().unwrap().insert(
                (student_id, course_id),
                EnrollmentRecord {
                    id,
                    progress_percentage: 0,
                    completed_at: None,
                },
            );
            id
        }
    }

    #[async_trait]
    impl EnrollmentStore for InMemoryEnrollments {
        async fn find_enrollment(
            &self,
            student_id: Uuid,
            course_id: Uuid,
        ) -> Result<Option<EnrollmentRecord>, StoreError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .get(&(student_id, course_id))
                .cloned())
        }

        async fn update_enrollment_progress(
            &self,
            enrollment_id: Uuid,
            progress_percentage: i32,
            completed_at: Option<DateTime<Utc>>,
        ) -> Result<(), StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let mut rows = self.rows.lock().unwrap();
            for record in rows.values_mut() {
                if record.id == enrollment_id {
                    record.progress_percentage = progress_percentage;
                    record.completed_at = completed_at;
                    return Ok(());
                }
            }
            Err(StoreError::Unavailable("enrollment vanished".to_string()))
        }
    }

    #[derive(Clone)]
    struct ProgressRow {
        id: Uuid,
        enrollment_id: Uuid,
        lesson_id: Uuid,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
    }

    struct InMemoryContent {
        lessons_by_course: Mutex<HashMap<Uuid, Vec<Uuid>>>,
        progress: Mutex<Vec<ProgressRow>>,
        writes: AtomicUsize,
    }

    impl InMemoryContent {
        fn new() -> Self {
            Self {
                lessons_by_course: Mutex::new(HashMap::new()),
                progress: Mutex::new(Vec::new()),
                writes: AtomicUsize::new(0),
            }
        }

        fn add_lessons(&self, course_id: Uuid, count: usize) -> Vec<Uuid> {
            let ids: Vec<Uuid> = (0..count).map(|_| Uuid::new_v4()).collect();
            self.lessons_by_course
                .lock()
                .unwrap()
                .entry(course_id)
                .or_default()
                .extend(ids.iter().copied());
            ids
        }
    }

    #[async_trait]
    impl ContentStore for InMemoryContent {
        async fn lesson_ids_for_course(&self, course_id: Uuid) -> Result<Vec<Uuid>, StoreError> {
            Ok(self
                .lessons_by_course
                .lock()
                .unwrap()
                .get(&course_id)
                .cloned()
                .unwrap_or_default())
        }

        async fn find_lesson_progress(
            &self,
            enrollment_id: Uuid,
            lesson_id: Uuid,
        ) -> Result<Option<LessonProgressRecord>, StoreError> {
            Ok(self
                .progress
                .lock()
                .unwrap()
                .iter()
                .find(|row| row.enrollment_id == enrollment_id && row.lesson_id == lesson_id)
                .map(|row| LessonProgressRecord {
                    id: row.id,
                    completed: row.completed,
                    completed_at: row.completed_at,
                }))
        }

        async fn insert_lesson_progress(
            &self,
            enrollment_id: Uuid,
            lesson_id: Uuid,
            completed: bool,
            completed_at: Option<DateTime<Utc>>,
        ) -> Result<(), StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.progress.lock().unwrap().push(ProgressRow {
                id: Uuid::new_v4(),
                enrollment_id,
                lesson_id,
                completed,
                completed_at,
            });
            Ok(())
        }

        async fn update_lesson_progress(
            &self,
            progress_id: Uuid,
            completed: bool,
            completed_at: Option<DateTime<Utc>>,
        ) -> Result<(), StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let mut rows = self.progress.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|row| row.id == progress_id)
                .ok_or_else(|| StoreError::Unavailable("progress row vanished".to_string()))?;
            row.completed = completed;
            row.completed_at = completed_at;
            Ok(())
        }

        async fn count_completed_lessons(&self, enrollment_id: Uuid) -> Result<i64, StoreError> {
            Ok(self
                .progress
                .lock()
                .unwrap()
                .iter()
                .filter(|row| row.enrollment_id == enrollment_id && row.completed)
                .count() as i64)
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    struct Fixture {
        tracker: ProgressTracker<InMemoryEnrollments, InMemoryContent>,
        student_id: Uuid,
        course_id: Uuid,
        enrollment_id: Uuid,
        lessons: Vec<Uuid>,
    }

    /// Course with two modules: [M1: 2 lessons, M2: 3 lessons]
    fn enrolled_fixture() -> Fixture {
        let enrollments = InMemoryEnrollments::new();
        let content = InMemoryContent::new();

        let student_id = Uuid::new_v4();
        let course_id = Uuid::new_v4();
        let enrollment_id = enrollments.enroll(student_id, course_id);

        let mut lessons = content.add_lessons(course_id, 2);
        lessons.extend(content.add_lessons(course_id, 3));

        Fixture {
            tracker: ProgressTracker::new(enrollments, content),
            student_id,
            course_id,
            enrollment_id,
            lessons,
        }
    }

    #[tokio::test]
    async fn test_denominator_counts_lessons_across_modules() {
        let fx = enrolled_fixture();

        let first = fx
            .tracker
            .mark_lesson_complete_at(fx.student_id, fx.course_id, fx.lessons[0], fixed_now())
            .await
            .unwrap();
        assert_eq!(first.total_lessons, 5);
        assert_eq!(first.completed_lessons, 1);
        assert_eq!(first.progress_percentage, 20);

        let second = fx
            .tracker
            .mark_lesson_complete_at(fx.student_id, fx.course_id, fx.lessons[1], fixed_now())
            .await
            .unwrap();
        assert_eq!(second.completed_lessons, 2);
        assert_eq!(second.progress_percentage, 40);
    }

    #[tokio::test]
    async fn test_idempotent_remark_keeps_completed_at_and_count() {
        let fx = enrolled_fixture();
        let first_time = fixed_now();
        let later = first_time + chrono::Duration::hours(3);

        let first = fx
            .tracker
            .mark_lesson_complete_at(fx.student_id, fx.course_id, fx.lessons[0], first_time)
            .await
            .unwrap();

        let second = fx
            .tracker
            .mark_lesson_complete_at(fx.student_id, fx.course_id, fx.lessons[0], later)
            .await
            .unwrap();

        assert_eq!(first.progress_percentage, second.progress_percentage);
        assert_eq!(first.completed_lessons, second.completed_lessons);

        // The per-lesson completion timestamp must not move on re-mark
        let state = fx
            .tracker
            .get_progress(fx.enrollment_id, fx.lessons[0])
            .await
            .unwrap();
        assert!(state.completed);
        assert_eq!(state.completed_at, Some(first_time));
    }

    #[tokio::test]
    async fn test_percentage_is_monotonic_across_distinct_lessons() {
        let fx = enrolled_fixture();

        let mut last = 0;
        for lesson_id in &fx.lessons {
            let progress = fx
                .tracker
                .mark_lesson_complete_at(fx.student_id, fx.course_id, *lesson_id, fixed_now())
                .await
                .unwrap();
            assert!(progress.progress_percentage >= last);
            last = progress.progress_percentage;
        }
        assert_eq!(last, 100);
    }

    #[tokio::test]
    async fn test_full_completion_sets_timestamp_and_new_lesson_reverts_it() {
        let fx = enrolled_fixture();
        let now = fixed_now();

        let mut progress = None;
        for lesson_id in &fx.lessons {
            progress = Some(
                fx.tracker
                    .mark_lesson_complete_at(fx.student_id, fx.course_id, *lesson_id, now)
                    .await
                    .unwrap(),
            );
        }
        let progress = progress.unwrap();
        assert_eq!(progress.progress_percentage, 100);
        assert_eq!(progress.completed_at, Some(now));

        // A sixth lesson published later dilutes the denominator; the next
        // completion-triggering recompute clears the completion timestamp
        let new_lesson = fx.tracker.content.add_lessons(fx.course_id, 1)[0];
        let after = fx
            .tracker
            .mark_lesson_complete_at(fx.student_id, fx.course_id, fx.lessons[0], now)
            .await
            .unwrap();
        assert_eq!(after.total_lessons, 6);
        assert_eq!(after.completed_lessons, 5);
        assert_eq!(after.progress_percentage, 83);
        assert_eq!(after.completed_at, None);

        // Completing the new lesson restores full completion
        let done = fx
            .tracker
            .mark_lesson_complete_at(fx.student_id, fx.course_id, new_lesson, now)
            .await
            .unwrap();
        assert_eq!(done.progress_percentage, 100);
        assert_eq!(done.completed_at, Some(now));
    }

    #[tokio::test]
    async fn test_not_enrolled_fails_without_writes() {
        let enrollments = InMemoryEnrollments::new();
        let content = InMemoryContent::new();
        let course_id = Uuid::new_v4();
        content.add_lessons(course_id, 3);

        let tracker = ProgressTracker::new(enrollments, content);
        let result = tracker
            .mark_lesson_complete_at(Uuid::new_v4(), course_id, Uuid::new_v4(), fixed_now())
            .await;

        assert!(matches!(result, Err(ProgressError::NotEnrolled { .. })));
        assert_eq!(tracker.enrollments.writes.load(Ordering::SeqCst), 0);
        assert_eq!(tracker.content.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_get_progress_defaults_to_not_started() {
        let fx = enrolled_fixture();

        let state = fx
            .tracker
            .get_progress(fx.enrollment_id, fx.lessons[0])
            .await
            .unwrap();

        assert_eq!(state, LessonCompletionState::default());
        assert!(!state.completed);
        assert!(state.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_rounding_thirds() {
        let enrollments = InMemoryEnrollments::new();
        let content = InMemoryContent::new();

        let student_id = Uuid::new_v4();
        let course_id = Uuid::new_v4();
        enrollments.enroll(student_id, course_id);
        let lessons = content.add_lessons(course_id, 3);

        let tracker = ProgressTracker::new(enrollments, content);

        let one = tracker
            .mark_lesson_complete_at(student_id, course_id, lessons[0], fixed_now())
            .await
            .unwrap();
        assert_eq!(one.progress_percentage, 33);

        let two = tracker
            .mark_lesson_complete_at(student_id, course_id, lessons[1], fixed_now())
            .await
            .unwrap();
        assert_eq!(two.progress_percentage, 67);
    }

    #[test]
    fn test_percentage_edge_cases() {
        assert_eq!(progress_percentage(0, 0), 0);
        assert_eq!(progress_percentage(0, 10), 0);
        assert_eq!(progress_percentage(10, 10), 100);
        assert_eq!(progress_percentage(1, 3), 33);
        assert_eq!(progress_percentage(2, 3), 67);
        assert_eq!(progress_percentage(2, 5), 40);
        assert_eq!(progress_percentage(5, 6), 83);
        // round-half-up
        assert_eq!(progress_percentage(1, 8), 13);
        assert_eq!(progress_percentage(1, 200), 1);
    }
}
