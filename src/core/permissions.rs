//! Role based menu and permission resolution.
//!
//! Every role maps to a fixed table of menu items and capabilities. The match in
//! [`role_permissions`] is exhaustive, so adding a role without deciding its access
//! does not compile.

use crate::{entities::sea_orm_active_enums::Role, errors::Error};
use std::{fmt, str::FromStr};

/// Sections of the back office a role may open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuItem {
    /// Overview figures
    Dashboard,
    /// Reservation list and details
    Bookings,
    /// Payments and installment plans
    Payments,
    /// Package catalog
    Packages,
    /// Destination pages
    Destinations,
    /// Discount coupons
    Coupons,
    /// Guide roster and assignments
    TourGuides,
    /// Customer records
    Customers,
    /// Staff accounts and roles
    Users,
    /// Analytics
    Reports,
    /// Agency settings
    Settings,
    /// A guide's own assignments
    MyTours,
    /// A customer's own bookings
    MyBookings,
}

impl MenuItem {
    /// Every menu item in display order.
    pub const ALL: &'static [Self] = &[
        Self::Dashboard,
        Self::Bookings,
        Self::Payments,
        Self::Packages,
        Self::Destinations,
        Self::Coupons,
        Self::TourGuides,
        Self::Customers,
        Self::Users,
        Self::Reports,
        Self::Settings,
        Self::MyTours,
        Self::MyBookings,
    ];

    /// Stable identifier
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Bookings => "bookings",
            Self::Payments => "payments",
            Self::Packages => "packages",
            Self::Destinations => "destinations",
            Self::Coupons => "coupons",
            Self::TourGuides => "tour_guides",
            Self::Customers => "customers",
            Self::Users => "users",
            Self::Reports => "reports",
            Self::Settings => "settings",
            Self::MyTours => "my_tours",
            Self::MyBookings => "my_bookings",
        }
    }

    /// Human readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Bookings => "Bookings",
            Self::Payments => "Payments",
            Self::Packages => "Packages",
            Self::Destinations => "Destinations",
            Self::Coupons => "Coupons",
            Self::TourGuides => "Tour Guides",
            Self::Customers => "Customers",
            Self::Users => "Users",
            Self::Reports => "Reports",
            Self::Settings => "Settings",
            Self::MyTours => "My Tours",
            Self::MyBookings => "My Bookings",
        }
    }
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MenuItem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|item| item.as_str() == wanted)
            .ok_or_else(|| Error::Validation {
                message: format!("unknown menu item '{s}'"),
            })
    }
}

/// Actions a role may perform, independent of which menus it sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Read any booking
    ViewBookings,
    /// Create bookings and change their status
    ManageBookings,
    /// Record payments, create plans, refund
    RecordPayments,
    /// Edit the package catalog
    ManagePackages,
    /// Create and disable coupons
    ManageCoupons,
    /// Assign guides to tours
    AssignGuides,
    /// Add staff and change roles
    ManageUsers,
    /// Read analytics
    ViewReports,
    /// Read one's own assignments
    ViewOwnTours,
    /// Read one's own bookings
    ViewOwnBookings,
}

impl Permission {
    /// Stable identifier
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ViewBookings => "view_bookings",
            Self::ManageBookings => "manage_bookings",
            Self::RecordPayments => "record_payments",
            Self::ManagePackages => "manage_packages",
            Self::ManageCoupons => "manage_coupons",
            Self::AssignGuides => "assign_guides",
            Self::ManageUsers => "manage_users",
            Self::ViewReports => "view_reports",
            Self::ViewOwnTours => "view_own_tours",
            Self::ViewOwnBookings => "view_own_bookings",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The static access table row for one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolePermissions {
    /// Role this row describes
    pub role: Role,
    /// Menu items the role sees, in display order
    pub menu_items: &'static [MenuItem],
    /// Actions the role may perform
    pub permissions: &'static [Permission],
}

/// The access table row for `role`.
#[must_use]
pub const fn role_permissions(role: Role) -> RolePermissions {
    use MenuItem as M;
    use Permission as P;

    let (menu_items, permissions): (&'static [MenuItem], &'static [Permission]) = match role {
        Role::SuperAdmin => (
            MenuItem::ALL,
            &[
                P::ViewBookings,
                P::ManageBookings,
                P::RecordPayments,
                P::ManagePackages,
                P::ManageCoupons,
                P::AssignGuides,
                P::ManageUsers,
                P::ViewReports,
            ],
        ),
        Role::Admin => (
            &[
                M::Dashboard,
                M::Bookings,
                M::Payments,
                M::Packages,
                M::Destinations,
                M::Coupons,
                M::TourGuides,
                M::Customers,
                M::Reports,
                M::Settings,
            ],
            &[
                P::ViewBookings,
                P::ManageBookings,
                P::RecordPayments,
                P::ManagePackages,
                P::ManageCoupons,
                P::AssignGuides,
                P::ViewReports,
            ],
        ),
        Role::BookingReservation => (
            &[
                M::Dashboard,
                M::Bookings,
                M::Payments,
                M::Packages,
                M::TourGuides,
                M::Customers,
            ],
            &[
                P::ViewBookings,
                P::ManageBookings,
                P::RecordPayments,
                P::AssignGuides,
            ],
        ),
        Role::TourGuide => (&[M::Dashboard, M::MyTours], &[P::ViewOwnTours]),
        Role::TravelAgent => (
            &[M::Dashboard, M::Bookings, M::Packages, M::Customers],
            &[P::ViewBookings, P::ManageBookings],
        ),
        Role::Finance => (
            &[M::Dashboard, M::Bookings, M::Payments, M::Reports],
            &[P::ViewBookings, P::RecordPayments, P::ViewReports],
        ),
        Role::SalesMarketing => (
            &[
                M::Dashboard,
                M::Packages,
                M::Destinations,
                M::Coupons,
                M::Customers,
                M::Reports,
            ],
            &[P::ManagePackages, P::ManageCoupons, P::ViewReports],
        ),
        Role::Customer => (&[M::Packages, M::MyBookings], &[P::ViewOwnBookings]),
    };

    RolePermissions {
        role,
        menu_items,
        permissions,
    }
}

/// Whether `role` may open `item`.
#[must_use]
pub fn has_menu_access(role: Role, item: MenuItem) -> bool {
    role_permissions(role).menu_items.contains(&item)
}

/// Menu items `role` may open, in display order.
#[must_use]
pub fn accessible_menu_items(role: Role) -> &'static [MenuItem] {
    role_permissions(role).menu_items
}

/// Whether `role` may perform `permission`.
#[must_use]
pub fn has_permission(role: Role, permission: Permission) -> bool {
    role_permissions(role).permissions.contains(&permission)
}
