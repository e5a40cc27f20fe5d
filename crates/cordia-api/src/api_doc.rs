//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cordia API",
        version = "0.1.0",
        description = "Multi-tenant CRM backend. Authenticate with a JWT bearer token \
                       or an org API key (Token header); select a tenant with the org header."
    ),
    paths(
        // Auth
        handlers::auth::login,
        handlers::auth::register,
        handlers::auth::refresh,
        // Orgs
        handlers::orgs::create_org,
        handlers::orgs::list_my_orgs,
        // Profile / roster
        handlers::profile::get_profile,
        handlers::profile::teams_users,
        // Users
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::delete_user,
        handlers::users::me_password,
        handlers::users::admin_reset_password,
        // Leads
        handlers::leads::list_leads,
        handlers::leads::create_lead,
        handlers::leads::get_lead,
        handlers::leads::update_lead,
        handlers::leads::delete_lead,
        handlers::leads::list_comments,
        handlers::leads::create_comment,
        handlers::leads::list_attachments,
        handlers::leads::create_attachment,
        // Companies
        handlers::companies::list_companies,
        handlers::companies::create_company,
        handlers::companies::get_company,
        handlers::companies::update_company,
        handlers::companies::delete_company,
        // Teams
        handlers::teams::list_teams,
        handlers::teams::create_team,
        handlers::teams::get_team,
        handlers::teams::update_team,
        handlers::teams::delete_team,
        // Documents
        handlers::documents::list_documents,
        handlers::documents::create_document,
        handlers::documents::get_document,
        handlers::documents::update_document,
        handlers::documents::delete_document,
        // Dashboard
        handlers::dashboard::dashboard,
    )
)]
pub struct ApiDoc;
