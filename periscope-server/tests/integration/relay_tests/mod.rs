mod test_renotification;
