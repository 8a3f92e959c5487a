/// What the generator does when the clock reads earlier than the timestamp of
/// the last issued ID.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClockPolicy {
    /// Treat the earlier reading as a new millisecond: reset the sequence and
    /// issue IDs with the lower timestamp.
    ///
    /// Matches classic snowflake implementations. IDs stay unique only while
    /// the regressed clock does not revisit a millisecond whose sequence
    /// space was already used, and they are no longer ordered.
    Reset,

    /// Never issue a timestamp lower than one already issued. Blocking calls
    /// wait for the clock to catch up; polling calls report
    /// [`IdGenStatus::Pending`] with the remaining gap.
    ///
    /// [`IdGenStatus::Pending`]: crate::IdGenStatus::Pending
    #[default]
    Wait,
}
