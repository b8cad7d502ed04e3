//! # Portiere (Multi-tenant Admin Portal Backend)
//!
//! `portiere` is the backend for a multi-tenant admin portal: companies
//! (tenants), users, role-based access, invitations, browser shortcuts,
//! subscription state, and a multi-step setup wizard for onboarding a new
//! tenant.
//!
//! ## Tenant Model
//!
//! Companies are the tenant boundary. Every user belongs to at most one
//! company; the first registrant of a flow is provisionally an `admin` until
//! they join an existing company via invitation. Handlers that load an entity
//! by id re-check its `company_id` against the caller's before acting, so a
//! principal from one tenant can never read or mutate another tenant's data.
//!
//! ## Authentication
//!
//! Sessions are bearer JWTs issued by a pluggable [`auth::AuthProvider`].
//! A token only proves *identity*: on every request the middleware re-reads
//! the user record from the [`store::DataStore`] for the authoritative role,
//! company and active flag, so deactivations and role changes take effect
//! immediately without token revocation.
//!
//! ## Onboarding
//!
//! Each company carries eight feature configuration flags and a
//! `CompanySetupProgress` record. Aggregate setup progress is derived on
//! demand from five company milestones (20 points each); the wizard's own
//! step/progress pair is stored verbatim and never merged with the derived
//! value.

pub mod api;
pub mod auth;
pub mod cli;
pub mod models;
pub mod onboarding;
pub mod store;
