//! The fixed set of Storefront operations that we relay.
//!
//! Callers pick one by name; the GraphQL text itself only ever comes from
//! here, so the proxy can't be used to run arbitrary queries with our token.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Exchange an email and password for a customer access token.
    Login,

    /// Update the profile of the customer owning an access token.
    Update,

    /// Fetch the profile of the customer owning an access token.
    GetCustomer,
}

const LOGIN_DOCUMENT: &str = r#"
mutation customerAccessTokenCreate($input: CustomerAccessTokenCreateInput!) {
  customerAccessTokenCreate(input: $input) {
    customerAccessToken {
      accessToken
      expiresAt
    }
    customerUserErrors {
      code
      field
      message
    }
  }
}
"#;

const UPDATE_DOCUMENT: &str = r#"
mutation customerUpdate($customerAccessToken: String!, $customer: CustomerUpdateInput!) {
  customerUpdate(customerAccessToken: $customerAccessToken, customer: $customer) {
    customer {
      id
      firstName
      lastName
      email
      phone
    }
    customerUserErrors {
      code
      field
      message
    }
  }
}
"#;

const GET_CUSTOMER_DOCUMENT: &str = r#"
query getCustomer($customerAccessToken: String!) {
  customer(customerAccessToken: $customerAccessToken) {
    id
    firstName
    lastName
    email
    phone
  }
}
"#;

impl Operation {
    pub const ALL: [Operation; 3] = [Operation::Login, Operation::Update, Operation::GetCustomer];

    /// Look up an operation by its action name. This is an exact match: no
    /// trimming, no case folding.
    pub fn from_action(action: &str) -> Option<Self> {
        match action {
            "login" => Some(Operation::Login),
            "update" => Some(Operation::Update),
            "getCustomer" => Some(Operation::GetCustomer),
            _ => None,
        }
    }

    pub fn action(self) -> &'static str {
        match self {
            Operation::Login => "login",
            Operation::Update => "update",
            Operation::GetCustomer => "getCustomer",
        }
    }

    pub fn document(self) -> &'static str {
        match self {
            Operation::Login => LOGIN_DOCUMENT,
            Operation::Update => UPDATE_DOCUMENT,
            Operation::GetCustomer => GET_CUSTOMER_DOCUMENT,
        }
    }

    /// The GraphQL variables that the document declares.
    pub fn variable_names(self) -> &'static [&'static str] {
        match self {
            Operation::Login => &["input"],
            Operation::Update => &["customerAccessToken", "customer"],
            Operation::GetCustomer => &["customerAccessToken"],
        }
    }
}
