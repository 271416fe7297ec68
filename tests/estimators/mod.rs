mod knn_estimator_tests;
