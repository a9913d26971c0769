mod contact_test;
mod http_test;
mod request_code_test;
mod signup_test;
