//! Paths on the auth server and gateway.

pub mod auth {
    pub const LOGIN: &str = "/auth/login";
    pub const REGISTER: &str = "/auth/register";
    pub const REFRESH: &str = "/auth/refresh";
    pub const LOGOUT: &str = "/auth/logout";
    pub const ME: &str = "/auth/me";
}

pub mod gateway {
    pub const SERVICES: &str = "/api/v1/services";
    pub const HEALTH: &str = "/health";
    pub const METRICS: &str = "/metrics";

    pub fn service_health(name: &str) -> String {
        format!("{}/{}/health", SERVICES, name)
    }
}

pub mod monitoring {
    pub const SYSTEM_METRICS: &str = "/api/v1/monitoring/metrics";
    pub const LOGS: &str = "/api/v1/monitoring/logs";
    pub const ALERT_RULES: &str = "/api/v1/monitoring/alerts/rules";
    pub const ACTIVE_ALERTS: &str = "/api/v1/monitoring/alerts/active";

    pub const GRAFANA_URL: &str = "/api/v1/monitoring/grafana/url";
    pub const PROMETHEUS_QUERY: &str = "/api/v1/monitoring/prometheus/query";

    pub fn service_metrics(name: &str) -> String {
        format!("/api/v1/monitoring/services/{}/metrics", name)
    }

    pub fn vm_metrics(id: &str) -> String {
        format!("/api/v1/monitoring/vms/{}/metrics", id)
    }
}

pub mod vm {
    pub const VMS: &str = "/api/v1/vms";
    pub const FLAVORS: &str = "/api/v1/flavors";
    pub const IMAGES: &str = "/api/v1/images";
    pub const NETWORKS: &str = "/api/v1/networks";
    pub const RESOURCE_USAGE: &str = "/api/v1/resources/usage";

    pub fn vm(id: &str) -> String {
        format!("{}/{}", VMS, id)
    }

    pub fn vm_console(id: &str) -> String {
        format!("{}/{}/console", VMS, id)
    }

    pub fn user_vms(user_id: &str) -> String {
        format!("/api/v1/users/{}/vms", user_id)
    }
}

pub mod users {
    pub const FRIENDS: &str = "/api/v1/users/friends";

    pub fn friend(id: &str) -> String {
        format!("{}/{}", FRIENDS, id)
    }
}
