//! Units of work for the job scheduler.

/// Identifier grouping scheduled jobs so a caller can wait for just that
/// group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct JobTag(pub u64);

impl JobTag {
    /// Create a new job tag.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw tag value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for JobTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JobTag({})", self.0)
    }
}

/// A unit of work run on a scheduler worker.
///
/// `execute` may run on any worker thread and must be thread-safe with
/// respect to whatever it shares with other jobs.
pub trait Job: Send + 'static {
    /// Group this job belongs to, if any.
    fn tag(&self) -> Option<JobTag> {
        None
    }

    /// Run the job, consuming it.
    fn execute(self: Box<Self>);
}

/// Adapter turning a closure into a [`Job`].
pub struct FnJob<F> {
    f: F,
    tag: Option<JobTag>,
}

impl<F> FnJob<F>
where
    F: FnOnce() + Send + 'static,
{
    /// Wrap an untagged closure.
    pub fn new(f: F) -> Self {
        Self { f, tag: None }
    }

    /// Put this job in a tagged group.
    #[must_use]
    pub fn with_tag(mut self, tag: JobTag) -> Self {
        self.tag = Some(tag);
        self
    }
}

impl<F> Job for FnJob<F>
where
    F: FnOnce() + Send + 'static,
{
    fn tag(&self) -> Option<JobTag> {
        self.tag
    }

    fn execute(self: Box<Self>) {
        (self.f)()
    }
}
