//! Authorization predicates over the resolved request context.
//!
//! Both predicates are total over any context, including an unresolved one:
//! `None` means unauthenticated and always answers false. Platform flags
//! (superuser, staff) dominate tenant-scoped flags.

use uuid::Uuid;

use crate::auth::context::RequestContext;

/// True iff the caller is a platform admin (superuser or staff) or their
/// resolved profile carries the org-admin flag.
///
/// Gates admin user management, roster access, and password resets for
/// others. Checks the boolean flag, not the role string; the two are
/// independent signals.
pub fn is_org_admin(ctx: Option<&RequestContext>) -> bool {
    let Some(ctx) = ctx else {
        return false;
    };

    if ctx.user.is_superuser || ctx.user.is_staff {
        return true;
    }

    ctx.profile.is_organization_admin
}

/// True iff the caller is staff or the target user is the caller.
///
/// Used for operations a user may always perform on themselves (e.g.
/// changing their own password) but that otherwise require escalation.
pub fn is_self_or_org_admin(ctx: Option<&RequestContext>, target_user_id: Uuid) -> bool {
    let Some(ctx) = ctx else {
        return false;
    };

    if ctx.user.is_staff {
        return true;
    }

    ctx.user.id == target_user_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cordia_core::models::{Org, Profile, ProfileRole, User};

    fn context(
        is_staff: bool,
        is_superuser: bool,
        is_organization_admin: bool,
    ) -> RequestContext {
        let user_id = Uuid::new_v4();
        let org_id = Uuid::new_v4();
        RequestContext {
            user: User {
                id: user_id,
                email: "member@example.com".to_string(),
                password_hash: "hash".to_string(),
                profile_pic: None,
                is_active: true,
                is_staff,
                is_superuser,
                last_login: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            profile: Profile {
                id: Uuid::new_v4(),
                user_id,
                org_id,
                role: ProfileRole::User,
                is_organization_admin,
                is_active: true,
                phone: None,
                alternate_phone: None,
                address: None,
                has_sales_access: false,
                has_marketing_access: false,
                date_of_joining: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            org: Org {
                id: org_id,
                name: "Org".to_string(),
                api_key: "key".to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            org_pinned_by_api_key: false,
        }
    }

    #[test]
    fn unauthenticated_is_never_admin() {
        assert!(!is_org_admin(None));
        assert!(!is_self_or_org_admin(None, Uuid::new_v4()));
    }

    #[test]
    fn superuser_passes_even_without_org_admin_flag() {
        let ctx = context(false, true, false);
        assert!(is_org_admin(Some(&ctx)));
    }

    #[test]
    fn staff_passes_even_without_org_admin_flag() {
        let ctx = context(true, false, false);
        assert!(is_org_admin(Some(&ctx)));
    }

    #[test]
    fn org_admin_flag_passes_for_plain_user() {
        let ctx = context(false, false, true);
        assert!(is_org_admin(Some(&ctx)));
    }

    #[test]
    fn plain_member_is_not_org_admin() {
        let ctx = context(false, false, false);
        assert!(!is_org_admin(Some(&ctx)));
    }

    #[test]
    fn self_check_matches_own_id_only() {
        let ctx = context(false, false, false);
        assert!(is_self_or_org_admin(Some(&ctx), ctx.user.id));
        assert!(!is_self_or_org_admin(Some(&ctx), Uuid::new_v4()));
    }

    #[test]
    fn staff_may_act_on_anyone() {
        let ctx = context(true, false, false);
        assert!(is_self_or_org_admin(Some(&ctx), Uuid::new_v4()));
    }

    #[test]
    fn org_admin_flag_does_not_extend_self_check() {
        // The self-or-admin predicate keys off the platform staff flag;
        // a tenant org admin acting on another user goes through the
        // org-scoped handlers instead.
        let ctx = context(false, false, true);
        assert!(!is_self_or_org_admin(Some(&ctx), Uuid::new_v4()));
    }
}
