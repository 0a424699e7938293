/// Permission predicates
///
/// Every check returns an [`Access`] value instead of a boolean so that the
/// web layer can treat "nobody is signed in" and "signed in as someone else"
/// differently but uniformly across routes.
///
/// # Rules
///
/// - Login-required pages: any signed-in user.
/// - Account update/delete: only the account itself.
/// - Task delete: only the task's author.
///
/// # Example
///
/// ```
/// use taskhub_shared::auth::authorization::{self_service, Access};
///
/// assert_eq!(self_service(Some(1), 1), Access::Allowed);
/// assert_eq!(self_service(Some(1), 2), Access::Forbidden);
/// assert_eq!(self_service(None, 1), Access::Unauthenticated);
/// ```

use crate::models::task::Task;

/// Outcome of a permission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The request may proceed
    Allowed,

    /// No user is signed in
    Unauthenticated,

    /// A user is signed in but is not permitted
    Forbidden,
}

impl Access {
    pub fn is_allowed(self) -> bool {
        self == Access::Allowed
    }
}

/// Allows any signed-in user
pub fn require_login(actor: Option<i64>) -> Access {
    match actor {
        Some(_) => Access::Allowed,
        None => Access::Unauthenticated,
    }
}

/// Allows only the user whose account is being changed
pub fn self_service(actor: Option<i64>, target_user_id: i64) -> Access {
    match actor {
        None => Access::Unauthenticated,
        Some(id) if id == target_user_id => Access::Allowed,
        Some(_) => Access::Forbidden,
    }
}

/// Allows only the author of the task
pub fn task_author(actor: Option<i64>, task: &Task) -> Access {
    match actor {
        None => Access::Unauthenticated,
        Some(id) if id == task.author_id => Access::Allowed,
        Some(_) => Access::Forbidden,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task_by(author_id: i64) -> Task {
        Task {
            id: 10,
            name: "Deploy".to_string(),
            description: String::new(),
            status_id: 1,
            author_id,
            executor_id: Some(3),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_require_login() {
        assert_eq!(require_login(Some(5)), Access::Allowed);
        assert_eq!(require_login(None), Access::Unauthenticated);
    }

    #[test]
    fn test_self_service() {
        assert!(self_service(Some(4), 4).is_allowed());
        assert_eq!(self_service(Some(4), 5), Access::Forbidden);
        assert_eq!(self_service(None, 4), Access::Unauthenticated);
    }

    #[test]
    fn test_task_author() {
        let task = task_by(1);

        assert_eq!(task_author(Some(1), &task), Access::Allowed);
        assert_eq!(task_author(None, &task), Access::Unauthenticated);
    }

    #[test]
    fn test_executor_is_not_author() {
        // Being assigned to a task does not grant deletion rights
        let task = task_by(1);
        assert_eq!(task_author(Some(3), &task), Access::Forbidden);
    }
}
