use super::User;
use std::collections::HashSet;

/// Popularity score of a user:
///
/// `|friends| + 0.5 * sum over friends of |own hobbies ∩ friend hobbies|`
///
/// The overlap is counted per friend. A hobby shared with three friends
/// contributes three half-points, not one; this is a sum of pairwise
/// intersection sizes, not a distinct-hobby count across the friend group.
pub fn popularity_score<'a>(
    user: &User,
    friend_hobbies: impl IntoIterator<Item = &'a HashSet<String>>,
) -> f64 {
    let shared: usize = friend_hobbies
        .into_iter()
        .map(|hobbies| hobbies.intersection(&user.hobbies).count())
        .sum();

    user.friends.len() as f64 + 0.5 * shared as f64
}
